use fixed_decimal::{Decimal, FloatPrecision};
use icu::locale::Locale as IcuLocale;
use icu::plurals::{
    PluralCategory as IcuCategory, PluralOperands, PluralRuleType, PluralRules,
    PluralRulesOptions, PluralRulesPreferences,
};

/// CLDR plural category, doubling as the key set of plural form maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// CLDR order: zero, one, two, few, many, other.
    pub const ALL: [PluralCategory; 6] = [
        PluralCategory::Zero,
        PluralCategory::One,
        PluralCategory::Two,
        PluralCategory::Few,
        PluralCategory::Many,
        PluralCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "zero" => Some(PluralCategory::Zero),
            "one" => Some(PluralCategory::One),
            "two" => Some(PluralCategory::Two),
            "few" => Some(PluralCategory::Few),
            "many" => Some(PluralCategory::Many),
            "other" => Some(PluralCategory::Other),
            _ => None,
        }
    }
}

fn from_icu(category: IcuCategory) -> PluralCategory {
    match category {
        IcuCategory::Zero => PluralCategory::Zero,
        IcuCategory::One => PluralCategory::One,
        IcuCategory::Two => PluralCategory::Two,
        IcuCategory::Few => PluralCategory::Few,
        IcuCategory::Many => PluralCategory::Many,
        IcuCategory::Other => PluralCategory::Other,
    }
}

/// Build plural operands from a count. Integral values go through the
/// integer path; fractional values keep their decimal digits so
/// `1.0` and `1.5` categorize differently where CLDR says they do.
fn operands(n: f64) -> PluralOperands {
    if n.is_nan() || n.is_infinite() {
        return PluralOperands::from(0u64);
    }
    let abs = n.abs();
    if abs == abs.floor() && abs < u64::MAX as f64 {
        return PluralOperands::from(abs as u64);
    }
    match Decimal::try_from_f64(abs, FloatPrecision::RoundTrip) {
        Ok(decimal) => PluralOperands::from(&decimal),
        Err(_) => PluralOperands::from(0u64),
    }
}

fn cardinal_rules(tag: &str) -> Option<PluralRules> {
    let icu_locale: IcuLocale = crate::locale::base(tag)
        .parse()
        .unwrap_or_else(|_| "en".parse().unwrap());
    let prefs = PluralRulesPreferences::from(&icu_locale);
    let mut opts = PluralRulesOptions::default();
    opts.rule_type = Some(PluralRuleType::Cardinal);
    PluralRules::try_new(prefs, opts).ok().or_else(|| {
        let english: IcuLocale = "en".parse().unwrap();
        let prefs = PluralRulesPreferences::from(&english);
        let mut opts = PluralRulesOptions::default();
        opts.rule_type = Some(PluralRuleType::Cardinal);
        PluralRules::try_new(prefs, opts).ok()
    })
}

/// The CLDR cardinal category for `count` under `tag`'s rules.
///
/// Unresolvable locales fall back to English rules; non-finite counts
/// are `Other`.
pub fn cardinal_category(tag: &str, count: f64) -> PluralCategory {
    if count.is_nan() || count.is_infinite() {
        return PluralCategory::Other;
    }
    match cardinal_rules(tag) {
        Some(rules) => from_icu(rules.category_for(operands(count))),
        None => PluralCategory::Other,
    }
}

/// The categories `tag`'s cardinal rules can produce, in CLDR order.
/// Used by lint to flag plural messages with unreachable or missing
/// forms.
pub fn cardinal_categories(tag: &str) -> Vec<PluralCategory> {
    let Some(rules) = cardinal_rules(tag) else {
        return vec![PluralCategory::Other];
    };
    let available: Vec<IcuCategory> = rules.categories().collect();
    PluralCategory::ALL
        .iter()
        .copied()
        .filter(|c| available.iter().any(|a| from_icu(*a) == *c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_cardinals() {
        assert_eq!(cardinal_category("en", 1.0), PluralCategory::One);
        assert_eq!(cardinal_category("en", 0.0), PluralCategory::Other);
        assert_eq!(cardinal_category("en", 2.0), PluralCategory::Other);
        assert_eq!(cardinal_category("en", 1.5), PluralCategory::Other);
    }

    #[test]
    fn french_treats_zero_as_one() {
        assert_eq!(cardinal_category("fr", 0.0), PluralCategory::One);
        assert_eq!(cardinal_category("fr", 1.0), PluralCategory::One);
        assert_eq!(cardinal_category("fr", 2.0), PluralCategory::Other);
    }

    #[test]
    fn russian_few_many() {
        assert_eq!(cardinal_category("ru", 1.0), PluralCategory::One);
        assert_eq!(cardinal_category("ru", 3.0), PluralCategory::Few);
        assert_eq!(cardinal_category("ru", 5.0), PluralCategory::Many);
        assert_eq!(cardinal_category("ru", 21.0), PluralCategory::One);
    }

    #[test]
    fn region_subtags_use_language_rules() {
        assert_eq!(cardinal_category("pt-BR", 1.0), PluralCategory::One);
        assert_eq!(cardinal_category("ru-RU", 5.0), PluralCategory::Many);
    }

    #[test]
    fn non_finite_counts_are_other() {
        assert_eq!(cardinal_category("en", f64::NAN), PluralCategory::Other);
        assert_eq!(cardinal_category("en", f64::INFINITY), PluralCategory::Other);
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(cardinal_category("???", 1.0), PluralCategory::One);
        assert_eq!(cardinal_category("???", 2.0), PluralCategory::Other);
    }

    #[test]
    fn available_categories_in_cldr_order() {
        let en = cardinal_categories("en");
        assert_eq!(en, vec![PluralCategory::One, PluralCategory::Other]);
        let ru = cardinal_categories("ru");
        assert!(ru.contains(&PluralCategory::Few));
        assert!(ru.contains(&PluralCategory::Many));
        assert_eq!(*ru.last().unwrap(), PluralCategory::Other);
    }

    #[test]
    fn category_keys_round_trip() {
        for category in PluralCategory::ALL {
            assert_eq!(PluralCategory::from_key(category.as_str()), Some(category));
        }
        assert_eq!(PluralCategory::from_key("none"), None);
    }
}
