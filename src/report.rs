use serde::Serialize;

use crate::catalog::Catalog;
use crate::interpolate::placeholder_names;
use crate::plural;
use crate::types::Message;

/// Translation completeness across every locale in a catalog.
#[derive(Clone, Debug, Serialize)]
pub struct CoverageReport {
    /// Unique key paths across all locales.
    pub total_keys: usize,
    pub locales: Vec<LocaleCoverage>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LocaleCoverage {
    pub locale: String,
    /// Keys authored directly in this locale. Runtime fallback is not
    /// counted: the report measures what translators have written.
    pub present: usize,
    pub missing: Vec<String>,
    pub percent: f32,
}

/// Reference key set = union of all locales' leaf paths, sorted.
pub fn all_keys(catalog: &Catalog) -> Vec<String> {
    let mut keys: Vec<String> = catalog
        .locales()
        .iter()
        .flat_map(|tag| catalog.keys(tag))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

pub fn coverage(catalog: &Catalog) -> CoverageReport {
    let reference = all_keys(catalog);
    let total = reference.len();
    let locales = catalog
        .locales()
        .iter()
        .map(|tag| {
            let own = catalog.keys(tag);
            let missing: Vec<String> = reference
                .iter()
                .filter(|key| own.binary_search(key).is_err())
                .cloned()
                .collect();
            let present = total - missing.len();
            let percent = if total == 0 {
                100.0
            } else {
                present as f32 / total as f32 * 100.0
            };
            LocaleCoverage {
                locale: (*tag).to_string(),
                present,
                missing,
                percent,
            }
        })
        .collect();
    CoverageReport {
        total_keys: total,
        locales,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintKind {
    /// A placeholder name that is not identifier-shaped.
    BadPlaceholderName,
    /// `{{` / `}}` pairs that do not balance.
    UnbalancedBraces,
    /// Placeholders differ from the reference locale's same message.
    PlaceholderMismatch,
    /// A plural message missing a form its locale's rules select for
    /// everyday integer counts.
    MissingPluralForm,
}

#[derive(Clone, Debug, Serialize)]
pub struct LintIssue {
    pub locale: String,
    pub scope: String,
    pub kind: LintKind,
    pub detail: String,
}

/// Categories a locale's rules actually select for everyday integer
/// counts. The full CLDR set is wider (French gains `many` at one
/// million), but catalogs reasonably omit forms no realistic count
/// reaches, so lint samples instead of demanding the full set.
fn common_categories(tag: &str) -> Vec<plural::PluralCategory> {
    const SAMPLE_COUNTS: [f64; 21] = [
        0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 15.0, 20.0, 21.0,
        22.0, 25.0, 30.0, 100.0, 101.0,
    ];
    let mut categories: Vec<plural::PluralCategory> = SAMPLE_COUNTS
        .iter()
        .map(|n| plural::cardinal_category(tag, *n))
        .collect();
    categories.sort_unstable();
    categories.dedup();
    categories
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (unicode_ident::is_xid_start(first) || first == '_')
        && chars.all(|c| unicode_ident::is_xid_continue(c) || c == '_')
}

fn count_occurrences(text: &str, pattern: &str) -> usize {
    text.matches(pattern).count()
}

/// Every placeholder referenced anywhere in a message. For plural
/// messages this is the union over forms, minus `count`, which forms
/// legitimately drop ("1 message" vs "{{count}} messages").
fn message_placeholders(node: &Message) -> Vec<String> {
    let mut names: Vec<String> = match node {
        Message::Text(text) => placeholder_names(text),
        Message::Plural(forms) => {
            let mut all: Vec<String> = forms
                .values()
                .flat_map(|form| placeholder_names(form))
                .collect();
            all.sort_unstable();
            all.dedup();
            all.retain(|name| name != "count");
            all
        }
        _ => Vec::new(),
    };
    names.sort_unstable();
    names
}

fn lint_template(issues: &mut Vec<LintIssue>, tag: &str, scope: &str, template: &str) {
    for name in placeholder_names(template) {
        if !is_identifier(&name) {
            issues.push(LintIssue {
                locale: tag.to_string(),
                scope: scope.to_string(),
                kind: LintKind::BadPlaceholderName,
                detail: format!("placeholder name {name:?} is not an identifier"),
            });
        }
    }
    if count_occurrences(template, "{{") != count_occurrences(template, "}}") {
        issues.push(LintIssue {
            locale: tag.to_string(),
            scope: scope.to_string(),
            kind: LintKind::UnbalancedBraces,
            detail: "unbalanced {{ }} pair".to_string(),
        });
    }
}

/// Static checks over a catalog. `reference_tag` (normally the default
/// locale) anchors the placeholder-consistency comparison.
pub fn lint(catalog: &Catalog, reference_tag: &str) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    for tag in catalog.locales() {
        let rule_categories = common_categories(tag);
        for scope in catalog.keys(tag) {
            let Some(node) = catalog.resolve(tag, &scope) else {
                continue;
            };
            match node {
                Message::Text(text) => lint_template(&mut issues, tag, &scope, text),
                Message::Plural(forms) => {
                    for form in forms.values() {
                        lint_template(&mut issues, tag, &scope, form);
                    }
                    for category in &rule_categories {
                        if !forms.contains_key(category) {
                            issues.push(LintIssue {
                                locale: tag.to_string(),
                                scope: scope.clone(),
                                kind: LintKind::MissingPluralForm,
                                detail: format!("no {:?} form", category.as_str()),
                            });
                        }
                    }
                }
                _ => {}
            }

            if tag != reference_tag
                && let Some(reference) = catalog.resolve(reference_tag, &scope)
            {
                let ours = message_placeholders(node);
                let theirs = message_placeholders(reference);
                if !theirs.is_empty() && ours != theirs {
                    issues.push(LintIssue {
                        locale: tag.to_string(),
                        scope: scope.clone(),
                        kind: LintKind::PlaceholderMismatch,
                        detail: format!("has {ours:?}, reference has {theirs:?}"),
                    });
                }
            }
        }
    }
    issues
}
