use chrono::{DateTime, FixedOffset, Offset, Utc};
use chrono_tz::{TZ_VARIANTS, Tz};

use crate::error::{Error, Result};

/// A resolved zone: a named IANA zone backed by the compiled tzdata
/// tables, or a fixed offset parsed from a `±HH:MM`-style identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Zone {
    pub fn name(&self) -> String {
        match self {
            Zone::Named(tz) => tz.name().to_string(),
            Zone::Fixed(offset) => format_offset(offset.local_minus_utc()),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Zone::Fixed(_))
    }
}

/// Legacy and link names mapped to their canonical zone. The compiled
/// tzdata parses most links itself; this table covers the spellings
/// common in stored user data that should canonicalize rather than
/// round-trip verbatim.
static LINK_MAP: &[(&str, &str)] = &[
    ("Etc/GMT", "UTC"),
    ("Etc/UTC", "UTC"),
    ("Etc/Greenwich", "UTC"),
    ("Etc/Universal", "UTC"),
    ("Etc/Zulu", "UTC"),
    ("GMT", "UTC"),
    ("GMT0", "UTC"),
    ("Greenwich", "UTC"),
    ("UCT", "UTC"),
    ("Universal", "UTC"),
    ("Zulu", "UTC"),
    ("US/Alaska", "America/Anchorage"),
    ("US/Aleutian", "America/Adak"),
    ("US/Arizona", "America/Phoenix"),
    ("US/Central", "America/Chicago"),
    ("US/East-Indiana", "America/Indiana/Indianapolis"),
    ("US/Eastern", "America/New_York"),
    ("US/Hawaii", "Pacific/Honolulu"),
    ("US/Michigan", "America/Detroit"),
    ("US/Mountain", "America/Denver"),
    ("US/Pacific", "America/Los_Angeles"),
    ("US/Samoa", "Pacific/Pago_Pago"),
    ("America/Buenos_Aires", "America/Argentina/Buenos_Aires"),
    ("America/Godthab", "America/Nuuk"),
    ("America/Indianapolis", "America/Indiana/Indianapolis"),
    ("America/Louisville", "America/Kentucky/Louisville"),
    ("America/Montreal", "America/Toronto"),
    ("Asia/Calcutta", "Asia/Kolkata"),
    ("Asia/Chongqing", "Asia/Shanghai"),
    ("Asia/Dacca", "Asia/Dhaka"),
    ("Asia/Istanbul", "Europe/Istanbul"),
    ("Asia/Katmandu", "Asia/Kathmandu"),
    ("Asia/Macao", "Asia/Macau"),
    ("Asia/Rangoon", "Asia/Yangon"),
    ("Asia/Saigon", "Asia/Ho_Chi_Minh"),
    ("Asia/Ulan_Bator", "Asia/Ulaanbaatar"),
    ("Australia/ACT", "Australia/Sydney"),
    ("Australia/Canberra", "Australia/Sydney"),
    ("Australia/NSW", "Australia/Sydney"),
    ("Europe/Belfast", "Europe/London"),
    ("Europe/Kiev", "Europe/Kyiv"),
    ("Europe/Uzhgorod", "Europe/Kyiv"),
    ("Europe/Zaporozhye", "Europe/Kyiv"),
    ("NZ", "Pacific/Auckland"),
    ("Japan", "Asia/Tokyo"),
    ("Singapore", "Asia/Singapore"),
    ("Hongkong", "Asia/Hong_Kong"),
    ("Iceland", "Atlantic/Reykjavik"),
    ("Israel", "Asia/Jerusalem"),
    ("Poland", "Europe/Warsaw"),
    ("Portugal", "Europe/Lisbon"),
];

/// Parse a bare offset identifier: `+05`, `+0530`, `-08:00`.
fn parse_offset_name(name: &str) -> Option<FixedOffset> {
    let bytes = name.as_bytes();
    let sign = match bytes.first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let rest = &name[1..];
    let (hours_str, minutes_str) = match rest.len() {
        1 | 2 => (rest, "0"),
        4 => (&rest[..2], &rest[2..]),
        5 if rest.as_bytes()[2] == b':' => (&rest[..2], &rest[3..]),
        _ => return None,
    };
    let hours: i32 = hours_str.parse().ok()?;
    let minutes: i32 = minutes_str.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Resolve an IANA name, case-insensitively, to its properly-cased
/// form. Exact parse first (hash lookup), full scan second.
fn resolve_named(name: &str) -> Option<Tz> {
    if let Ok(tz) = name.parse::<Tz>() {
        return Some(tz);
    }
    TZ_VARIANTS
        .iter()
        .find(|tz| tz.name().eq_ignore_ascii_case(name))
        .copied()
}

fn canonical_name(name: &str) -> Option<&'static str> {
    LINK_MAP
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, canonical)| *canonical)
}

/// Resolve a zone identifier: fixed offsets, canonical IANA names,
/// legacy aliases, any casing.
pub fn lookup(name: &str) -> Result<Zone> {
    if name.is_empty() {
        return Err(Error::UnknownTimeZone(name.to_string()));
    }
    if let Some(offset) = parse_offset_name(name) {
        return Ok(Zone::Fixed(offset));
    }
    let target = canonical_name(name).unwrap_or(name);
    resolve_named(target)
        .map(Zone::Named)
        .ok_or_else(|| Error::UnknownTimeZone(name.to_string()))
}

/// UTC offset of the zone at an instant, in seconds east of UTC.
/// Historical transitions and DST are reflected for named zones.
pub fn offset_at(zone: Zone, instant: DateTime<Utc>) -> i32 {
    match zone {
        Zone::Named(tz) => instant.with_timezone(&tz).offset().fix().local_minus_utc(),
        Zone::Fixed(offset) => offset.local_minus_utc(),
    }
}

/// Zone abbreviation at an instant (`EST`, `CEST`). Zones without a
/// lettered abbreviation in tzdata render as a `±HH:MM` offset.
pub fn abbreviation_at(zone: Zone, instant: DateTime<Utc>) -> String {
    match zone {
        Zone::Named(tz) => {
            let abbr = instant.with_timezone(&tz).format("%Z").to_string();
            if abbr.is_empty() || abbr.starts_with('+') || abbr.starts_with('-') {
                format_offset(offset_at(zone, instant))
            } else {
                abbr
            }
        }
        Zone::Fixed(offset) => format_offset(offset.local_minus_utc()),
    }
}

/// `±HH:MM` rendering of an offset in seconds.
pub fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.abs();
    format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
}

/// `±HHMM` rendering, the `strftime` `%z` shape.
pub fn format_offset_compact(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.abs();
    format!("{}{:02}{:02}", sign, abs / 3600, (abs % 3600) / 60)
}

/// IANA name of the host zone, `"UTC"` when detection fails.
pub fn system_zone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// All zone names in the compiled tzdata, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = TZ_VARIANTS.iter().map(|tz| tz.name()).collect();
    names.sort_unstable();
    names
}

/// The next instant after `from` at which the zone's offset or
/// abbreviation changes, to one-second precision. `None` for fixed
/// offsets and for zones with no change within the two-year search
/// horizon.
pub fn next_transition(zone: Zone, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let Zone::Named(_) = zone else {
        return None;
    };
    let state_at = |t: DateTime<Utc>| (offset_at(zone, t), abbreviation_at(zone, t));
    let start = state_at(from);

    // Coarse scan by day, then bisect down to the second.
    let horizon_days = 366i64 * 2;
    let mut prev = from;
    let mut changed_at = None;
    for day in 1..=horizon_days {
        let t = from + chrono::Duration::days(day);
        if state_at(t) != start {
            changed_at = Some((prev, t));
            break;
        }
        prev = t;
    }
    let (mut lo, mut hi) = changed_at?;
    while hi - lo > chrono::Duration::seconds(1) {
        let mid = lo + (hi - lo) / 2;
        if state_at(mid) == start {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn lookup_canonical_name() {
        let zone = lookup("America/New_York").unwrap();
        assert_eq!(zone.name(), "America/New_York");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let zone = lookup("america/new_york").unwrap();
        assert_eq!(zone.name(), "America/New_York");
    }

    #[test]
    fn legacy_aliases_canonicalize() {
        assert_eq!(lookup("US/Eastern").unwrap().name(), "America/New_York");
        assert_eq!(lookup("Asia/Calcutta").unwrap().name(), "Asia/Kolkata");
        assert_eq!(lookup("GMT").unwrap().name(), "UTC");
    }

    #[test]
    fn unknown_zone_errors() {
        assert!(matches!(
            lookup("Mars/Olympus_Mons"),
            Err(Error::UnknownTimeZone(_))
        ));
        assert!(lookup("").is_err());
    }

    #[test]
    fn fixed_offset_identifiers() {
        let zone = lookup("+05:30").unwrap();
        assert!(zone.is_fixed());
        assert_eq!(zone.name(), "+05:30");
        assert_eq!(offset_at(zone, at(2021, 1, 1, 0)), 5 * 3600 + 30 * 60);
        assert_eq!(lookup("-08").unwrap().name(), "-08:00");
        assert_eq!(lookup("+0545").unwrap().name(), "+05:45");
        assert!(lookup("+99").is_err());
        assert!(lookup("+1:30").is_err());
    }

    #[test]
    fn dst_offsets_and_abbreviations() {
        let ny = lookup("America/New_York").unwrap();
        let winter = at(2021, 1, 15, 12);
        let summer = at(2021, 7, 15, 12);
        assert_eq!(offset_at(ny, winter), -5 * 3600);
        assert_eq!(offset_at(ny, summer), -4 * 3600);
        assert_eq!(abbreviation_at(ny, winter), "EST");
        assert_eq!(abbreviation_at(ny, summer), "EDT");
    }

    #[test]
    fn numeric_abbreviations_render_as_offsets() {
        let kolkata = lookup("Asia/Kolkata").unwrap();
        let abbr = abbreviation_at(kolkata, at(2021, 1, 1, 0));
        assert!(abbr == "IST" || abbr == "+05:30", "got {abbr}");
    }

    #[test]
    fn offset_rendering() {
        assert_eq!(format_offset(19800), "+05:30");
        assert_eq!(format_offset(-28800), "-08:00");
        assert_eq!(format_offset(0), "+00:00");
        assert_eq!(format_offset_compact(-16200), "-0430");
    }

    #[test]
    fn transition_search_finds_dst_start() {
        let ny = lookup("America/New_York").unwrap();
        // US DST began 2021-03-14 at 07:00 UTC.
        let next = next_transition(ny, at(2021, 2, 1, 0)).unwrap();
        assert_eq!(next, at(2021, 3, 14, 7));
    }

    #[test]
    fn no_transition_for_fixed_zones() {
        let zone = lookup("+02:00").unwrap();
        assert!(next_transition(zone, at(2021, 1, 1, 0)).is_none());
        let kolkata = lookup("Asia/Kolkata").unwrap();
        assert!(next_transition(kolkata, at(2021, 1, 1, 0)).is_none());
    }

    #[test]
    fn zone_listing_contains_major_zones() {
        let all = names();
        assert!(all.binary_search(&"Europe/Paris").is_ok());
        assert!(all.binary_search(&"America/Sao_Paulo").is_ok());
        assert!(all.len() > 400);
    }

    #[test]
    fn system_zone_is_nonempty() {
        assert!(!system_zone().is_empty());
    }
}
