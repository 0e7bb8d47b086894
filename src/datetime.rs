use std::fmt::Display;

use chrono::{DateTime, Datelike, NaiveDate, Offset, TimeZone, Timelike, Utc};

use crate::timezone;
use crate::translator::{Options, Translator};

// English defaults, used whenever the catalog has no name tables for
// the target locale.
const MONTHS_LONG: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
// Sunday-first, the conventional order of catalog day tables.
const DAYS_LONG: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];
const DAYS_ABBR: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn options_for(locale: Option<&str>) -> Options {
    match locale {
        Some(tag) => Options::new().locale(tag),
        None => Options::new(),
    }
}

/// A month name from the catalog's `date.month_names` /
/// `date.abbr_month_names` tables. Tables may be 1-based (13 slots
/// with a placeholder at index 0) or plain 12-element lists.
fn month_name(tr: &Translator, locale: Option<&str>, month: u32, abbreviated: bool) -> String {
    let scope = if abbreviated {
        "date.abbr_month_names"
    } else {
        "date.month_names"
    };
    if let Some(list) = tr.list(scope, &options_for(locale)) {
        let idx = match list.len() {
            13 => month as usize,
            12 => month as usize - 1,
            _ => usize::MAX,
        };
        if let Some(name) = list.get(idx)
            && !name.is_empty()
        {
            return name.clone();
        }
    }
    let table = if abbreviated { MONTHS_ABBR } else { MONTHS_LONG };
    table[(month as usize - 1).min(11)].to_string()
}

/// A weekday name from `date.day_names` / `date.abbr_day_names`
/// (Sunday-first) with the English table as fallback.
fn day_name(tr: &Translator, locale: Option<&str>, from_sunday: u32, abbreviated: bool) -> String {
    let scope = if abbreviated {
        "date.abbr_day_names"
    } else {
        "date.day_names"
    };
    if let Some(list) = tr.list(scope, &options_for(locale)) {
        if let Some(name) = list.get(from_sunday as usize)
            && !name.is_empty()
        {
            return name.clone();
        }
    }
    let table = if abbreviated { DAYS_ABBR } else { DAYS_LONG };
    table[(from_sunday as usize).min(6)].to_string()
}

fn meridiem(tr: &Translator, locale: Option<&str>, hour: u32) -> String {
    let scope = if hour < 12 { "time.am" } else { "time.pm" };
    let opts = options_for(locale);
    if let Some((_, node)) = tr.lookup(scope, &opts)
        && let Some(text) = node.as_text()
    {
        return text.to_string();
    }
    if hour < 12 { "am".to_string() } else { "pm".to_string() }
}

fn hour12(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

/// Render a date/time through a `strftime`-style template, drawing
/// localized names from the catalog.
///
/// Supported directives: `%Y %y %m %d %e %j %H %k %I %l %M %S %p %P
/// %A %a %B %b %z %Z %%`, each of `%m %d %H %I %M %S` also in the
/// unpadded `%-m` spelling. Unknown directives pass through verbatim.
pub fn strftime<Tz>(
    tr: &Translator,
    dt: &DateTime<Tz>,
    template: &str,
    locale: Option<&str>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::with_capacity(template.len() * 2);
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let unpadded = chars.peek() == Some(&'-');
        if unpadded {
            chars.next();
        }
        let Some(directive) = chars.next() else {
            out.push('%');
            if unpadded {
                out.push('-');
            }
            break;
        };
        let pad2 = |n: u32| {
            if unpadded {
                n.to_string()
            } else {
                format!("{n:02}")
            }
        };
        match directive {
            'Y' => out.push_str(&dt.year().to_string()),
            'y' => out.push_str(&format!("{:02}", dt.year().rem_euclid(100))),
            'm' => out.push_str(&pad2(dt.month())),
            'd' => out.push_str(&pad2(dt.day())),
            'e' => out.push_str(&format!("{:2}", dt.day())),
            'j' => out.push_str(&format!("{:03}", dt.ordinal())),
            'H' => out.push_str(&pad2(dt.hour())),
            'k' => out.push_str(&format!("{:2}", dt.hour())),
            'I' => out.push_str(&pad2(hour12(dt.hour()))),
            'l' => out.push_str(&format!("{:2}", hour12(dt.hour()))),
            'M' => out.push_str(&pad2(dt.minute())),
            'S' => out.push_str(&pad2(dt.second())),
            'p' => out.push_str(&meridiem(tr, locale, dt.hour()).to_uppercase()),
            'P' => out.push_str(&meridiem(tr, locale, dt.hour()).to_lowercase()),
            'A' => out.push_str(&day_name(
                tr,
                locale,
                dt.weekday().num_days_from_sunday(),
                false,
            )),
            'a' => out.push_str(&day_name(
                tr,
                locale,
                dt.weekday().num_days_from_sunday(),
                true,
            )),
            'B' => out.push_str(&month_name(tr, locale, dt.month(), false)),
            'b' => out.push_str(&month_name(tr, locale, dt.month(), true)),
            'z' => out.push_str(&timezone::format_offset_compact(
                dt.offset().fix().local_minus_utc(),
            )),
            'Z' => out.push_str(&dt.format("%Z").to_string()),
            '%' => out.push('%'),
            other => {
                out.push('%');
                if unpadded {
                    out.push('-');
                }
                out.push(other);
            }
        }
    }
    out
}

fn builtin_time_format(style: &str) -> &'static str {
    match style {
        "short" => "%d %b %H:%M",
        "long" => "%B %d, %Y %H:%M",
        _ => "%a, %d %b %Y %H:%M:%S %z",
    }
}

fn builtin_date_format(style: &str) -> &'static str {
    match style {
        "short" => "%b %d",
        "long" => "%B %d, %Y",
        _ => "%Y-%m-%d",
    }
}

/// Render a date/time through a named style. The template comes from
/// `time.formats.<style>` in the catalog, falling back to built-in
/// defaults for `default`/`short`/`long`.
pub fn localize<Tz>(tr: &Translator, dt: &DateTime<Tz>, style: &str, locale: Option<&str>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let opts = options_for(locale);
    let template = tr
        .lookup(&format!("time.formats.{style}"), &opts)
        .and_then(|(_, node)| node.as_text().map(str::to_string))
        .unwrap_or_else(|| builtin_time_format(style).to_string());
    strftime(tr, dt, &template, locale)
}

/// Date-only counterpart of [`localize`], using `date.formats.<style>`.
pub fn localize_date(tr: &Translator, date: NaiveDate, style: &str, locale: Option<&str>) -> String {
    let opts = options_for(locale);
    let template = tr
        .lookup(&format!("date.formats.{style}"), &opts)
        .and_then(|(_, node)| node.as_text().map(str::to_string))
        .unwrap_or_else(|| builtin_date_format(style).to_string());
    // Midnight UTC stand-in; date styles have no time directives.
    let dt = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default());
    strftime(tr, &dt, &template, locale)
}

/// Express the span between two instants in words, choosing a bucket
/// and rendering it through `datetime.distance_in_words.*` catalog
/// entries (pluralized, `count` interpolated). English wording is the
/// fallback when a locale has no entries.
pub fn distance_of_time_in_words(
    tr: &Translator,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    locale: Option<&str>,
) -> String {
    let seconds = (to - from).num_seconds().abs();
    let minutes = (seconds as f64 / 60.0).round() as i64;
    let hours = (minutes as f64 / 60.0).round() as i64;
    let days = (hours as f64 / 24.0).round() as i64;
    let months = (days as f64 / 30.44).round() as i64;
    let years = (days as f64 / 365.25).round() as i64;

    let (key, count) = if seconds < 30 {
        ("x_seconds", seconds)
    } else if seconds < 90 {
        ("half_a_minute", -1)
    } else if minutes < 45 {
        ("x_minutes", minutes)
    } else if hours < 24 {
        ("x_hours", hours)
    } else if days < 30 {
        ("x_days", days)
    } else if months < 12 {
        ("x_months", months.max(1))
    } else {
        ("x_years", years.max(1))
    };

    let mut opts = options_for(locale)
        .scope_prefix("datetime.distance_in_words")
        .default_value(builtin_distance(key, count));
    if count >= 0 {
        opts = opts.count(count as f64);
    }
    tr.translate(key, &opts)
}

fn builtin_distance(key: &str, count: i64) -> String {
    let plural = |one: &str, many: &str| {
        if count == 1 {
            one.to_string()
        } else {
            many.to_string()
        }
    };
    match key {
        "x_seconds" => plural("1 second", "{{count}} seconds"),
        "half_a_minute" => "half a minute".to_string(),
        "x_minutes" => plural("1 minute", "{{count}} minutes"),
        "x_hours" => plural("1 hour", "{{count}} hours"),
        "x_days" => plural("1 day", "{{count}} days"),
        "x_months" => plural("1 month", "{{count}} months"),
        "x_years" => plural("1 year", "{{count}} years"),
        _ => String::new(),
    }
}

/// `distance_of_time_in_words` wrapped in the past/future phrasing
/// from `datetime.distance_in_words.past` / `.future`
/// (`"{{distance}} ago"` / `"in {{distance}}"` by default).
pub fn time_ago_in_words(
    tr: &Translator,
    then: DateTime<Utc>,
    now: DateTime<Utc>,
    locale: Option<&str>,
) -> String {
    let distance = distance_of_time_in_words(tr, then, now, locale);
    let (key, default) = if then <= now {
        ("past", "{{distance}} ago")
    } else {
        ("future", "in {{distance}}")
    };
    let opts = options_for(locale)
        .scope_prefix("datetime.distance_in_words")
        .default_value(default)
        .value("distance", distance);
    tr.translate(key, &opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    fn french() -> Translator {
        let mut tr = Translator::new();
        let fr: Message = serde_json::from_str(
            r#"{
                "date": {
                    "month_names": [null, "janvier", "février", "mars", "avril", "mai", "juin",
                                    "juillet", "août", "septembre", "octobre", "novembre", "décembre"],
                    "abbr_month_names": [null, "jan.", "fév.", "mars", "avr.", "mai", "juin",
                                         "juil.", "août", "sept.", "oct.", "nov.", "déc."],
                    "day_names": ["dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi"],
                    "formats": {"long": "%e %B %Y"}
                },
                "time": {"formats": {"short": "%d/%m %H:%M"}},
                "datetime": {
                    "distance_in_words": {
                        "x_minutes": {"one": "%{count} minute", "other": "%{count} minutes"},
                        "past": "il y a {{distance}}"
                    }
                }
            }"#,
        )
        .unwrap();
        tr.store("fr", fr);
        tr
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn english_defaults() {
        let tr = Translator::new();
        let dt = at(2021, 7, 4, 15, 5, 9);
        assert_eq!(
            strftime(&tr, &dt, "%A %B %-d, %Y %H:%M:%S", None),
            "Sunday July 4, 2021 15:05:09"
        );
        assert_eq!(strftime(&tr, &dt, "%a %b %d %y", None), "Sun Jul 04 21");
    }

    #[test]
    fn twelve_hour_clock() {
        let tr = Translator::new();
        assert_eq!(
            strftime(&tr, &at(2021, 1, 1, 0, 0, 0), "%I %p", None),
            "12 AM"
        );
        assert_eq!(
            strftime(&tr, &at(2021, 1, 1, 13, 0, 0), "%I:%M %P", None),
            "01:00 pm"
        );
        assert_eq!(strftime(&tr, &at(2021, 1, 1, 13, 0, 0), "%l", None), " 1");
    }

    #[test]
    fn ordinal_and_offset() {
        let tr = Translator::new();
        let dt = at(2021, 2, 1, 0, 0, 0);
        assert_eq!(strftime(&tr, &dt, "%j", None), "032");
        assert_eq!(strftime(&tr, &dt, "%z", None), "+0000");
        assert_eq!(strftime(&tr, &dt, "%Z", None), "UTC");
    }

    #[test]
    fn unknown_directives_pass_through() {
        let tr = Translator::new();
        let dt = at(2021, 1, 1, 0, 0, 0);
        assert_eq!(strftime(&tr, &dt, "%Q %% %-Q", None), "%Q % %-Q");
        assert_eq!(strftime(&tr, &dt, "trailing %", None), "trailing %");
    }

    #[test]
    fn localized_names_from_catalog() {
        let tr = french();
        let dt = at(2021, 8, 1, 0, 0, 0);
        assert_eq!(
            strftime(&tr, &dt, "%A %-d %B", Some("fr")),
            "dimanche 1 août"
        );
        assert_eq!(strftime(&tr, &dt, "%b", Some("fr")), "août");
    }

    #[test]
    fn named_styles() {
        let tr = french();
        let dt = at(2021, 8, 7, 9, 30, 0);
        assert_eq!(localize(&tr, &dt, "short", Some("fr")), "07/08 09:30");
        // No fr time.formats.long: built-in template, localized names.
        assert_eq!(localize(&tr, &dt, "long", Some("fr")), "août 07, 2021 09:30");
        assert_eq!(
            localize_date(&tr, NaiveDate::from_ymd_opt(2021, 8, 7).unwrap(), "long", Some("fr")),
            " 7 août 2021"
        );
        let en = Translator::new();
        assert_eq!(
            localize_date(&en, NaiveDate::from_ymd_opt(2021, 8, 7).unwrap(), "default", None),
            "2021-08-07"
        );
    }

    #[test]
    fn distance_buckets() {
        let tr = Translator::new();
        let base = at(2021, 1, 1, 0, 0, 0);
        let cases = [
            (5, "5 seconds"),
            (45, "half a minute"),
            (120, "2 minutes"),
            (3600, "1 hour"),
            (86_400 * 3, "3 days"),
            (86_400 * 62, "2 months"),
            (86_400 * 800, "2 years"),
        ];
        for (secs, expected) in cases {
            let to = base + chrono::Duration::seconds(secs);
            assert_eq!(
                distance_of_time_in_words(&tr, base, to, None),
                expected,
                "{secs}s"
            );
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let tr = Translator::new();
        let base = at(2021, 1, 1, 0, 0, 0);
        let to = base + chrono::Duration::seconds(120);
        assert_eq!(
            distance_of_time_in_words(&tr, base, to, None),
            distance_of_time_in_words(&tr, to, base, None)
        );
    }

    #[test]
    fn time_ago_wraps_direction() {
        let tr = Translator::new();
        let now = at(2021, 1, 1, 1, 0, 0);
        let before = at(2021, 1, 1, 0, 58, 0);
        let after = at(2021, 1, 1, 1, 2, 0);
        assert_eq!(time_ago_in_words(&tr, before, now, None), "2 minutes ago");
        assert_eq!(time_ago_in_words(&tr, after, now, None), "in 2 minutes");
    }

    #[test]
    fn localized_distance_goes_through_catalog() {
        let tr = french();
        let now = at(2021, 1, 1, 1, 0, 0);
        let before = at(2021, 1, 1, 0, 58, 0);
        assert_eq!(
            time_ago_in_words(&tr, before, now, Some("fr")),
            "il y a 2 minutes"
        );
        assert_eq!(
            distance_of_time_in_words(&tr, before, now, Some("fr")),
            "2 minutes"
        );
    }
}
