use icu::locale::Locale as IcuLocale;

use crate::error::{Error, Result};

/// Validate and canonicalize a BCP 47 tag (`"pt-br"` → `"pt-BR"`).
pub fn canonicalize(tag: &str) -> Result<String> {
    let parsed: IcuLocale = tag
        .parse()
        .map_err(|_| Error::InvalidLocale(tag.to_string()))?;
    Ok(parsed.to_string())
}

pub fn is_valid(tag: &str) -> bool {
    tag.parse::<IcuLocale>().is_ok()
}

/// Canonicalize a list of tags, deduplicating while preserving order.
/// The first malformed tag aborts the whole list.
pub fn canonicalize_list<I, S>(tags: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = Vec::new();
    for tag in tags {
        let canonical = canonicalize(tag.as_ref())?;
        if !seen.contains(&canonical) {
            seen.push(canonical);
        }
    }
    Ok(seen)
}

/// Strip Unicode `-u-` extension sequences from a tag, leaving any
/// private-use `-x-` suffix intact. `"en-u-ca-buddhist"` → `"en"`.
pub fn strip_extensions(tag: &str) -> String {
    let search_end = tag.find("-x-").unwrap_or(tag.len());
    let search_part = &tag[..search_end];
    let Some(idx) = search_part.find("-u-") else {
        return tag.to_string();
    };
    let before = &tag[..idx];
    let after_u = &tag[idx + 3..];
    let tokens: Vec<&str> = after_u.split('-').collect();
    let mut end_of_u = tokens.len();
    for (i, token) in tokens.iter().enumerate() {
        if token.len() == 1 && *token != "u" {
            end_of_u = i;
            break;
        }
    }
    if end_of_u < tokens.len() {
        format!("{}-{}", before, tokens[end_of_u..].join("-"))
    } else {
        before.to_string()
    }
}

/// The tag reduced to language/script/region, canonicalized when it
/// parses, verbatim minus extensions otherwise.
pub fn base(tag: &str) -> String {
    let stripped = strip_extensions(tag);
    match stripped.parse::<IcuLocale>() {
        Ok(locale) => locale.to_string(),
        Err(_) => stripped,
    }
}

/// The primary language subtag: `"pt-BR"` → `"pt"`.
pub fn language(tag: &str) -> String {
    base(tag)
        .split('-')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Expand a tag into its truncation lookup chain: `"zh-Hant-TW"` →
/// `["zh-Hant-TW", "zh-Hant", "zh"]`. The chain starts with the tag as
/// given (catalogs may be keyed by it verbatim), followed by the
/// canonical form when spelled differently, then each truncation.
pub fn fallback_chain(tag: &str) -> Vec<String> {
    let mut chain = vec![tag.to_string()];
    let full = base(tag);
    if full != tag {
        chain.push(full.clone());
    }
    let mut current = full.as_str();
    while let Some(idx) = current.rfind('-') {
        current = &current[..idx];
        if !current.is_empty() {
            chain.push(current.to_string());
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_fixes_case() {
        assert_eq!(canonicalize("pt-br").unwrap(), "pt-BR");
        assert_eq!(canonicalize("EN").unwrap(), "en");
        assert_eq!(canonicalize("zh-hant-tw").unwrap(), "zh-Hant-TW");
    }

    #[test]
    fn canonicalize_rejects_garbage() {
        assert!(canonicalize("not a tag").is_err());
        assert!(canonicalize("").is_err());
    }

    #[test]
    fn list_dedupes_preserving_order() {
        let list = canonicalize_list(["fr", "pt-br", "FR"]).unwrap();
        assert_eq!(list, vec!["fr", "pt-BR"]);
    }

    #[test]
    fn list_aborts_on_malformed_tag() {
        assert!(canonicalize_list(["fr", "!!"]).is_err());
    }

    #[test]
    fn extensions_are_stripped() {
        assert_eq!(strip_extensions("en-u-ca-buddhist"), "en");
        assert_eq!(strip_extensions("de-DE-u-co-phonebk"), "de-DE");
        assert_eq!(strip_extensions("fr"), "fr");
    }

    #[test]
    fn chain_truncates_subtags() {
        assert_eq!(fallback_chain("pt-BR"), vec!["pt-BR", "pt"]);
        assert_eq!(fallback_chain("zh-Hant-TW"), vec!["zh-Hant-TW", "zh-Hant", "zh"]);
        assert_eq!(fallback_chain("en"), vec!["en"]);
    }

    #[test]
    fn language_subtag() {
        assert_eq!(language("pt-BR"), "pt");
        assert_eq!(language("en"), "en");
    }
}
