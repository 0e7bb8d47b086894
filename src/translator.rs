use std::path::Path;

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::interpolate::{self, Value, Values};
use crate::locale;
use crate::plural::{self, PluralCategory};
use crate::types::Message;

/// The last lookup level after every configured locale is exhausted.
const LAST_RESORT_LOCALE: &str = "en";

/// Per-call translation options.
#[derive(Clone, Debug, Default)]
pub struct Options {
    locale: Option<String>,
    scope_prefix: Option<String>,
    default_value: Option<String>,
    count: Option<f64>,
    values: Values,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the translator's active locale for this call only.
    pub fn locale(mut self, tag: impl Into<String>) -> Self {
        self.locale = Some(tag.into());
        self
    }

    /// Dotted scope joined in front of the lookup path.
    pub fn scope_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.scope_prefix = Some(prefix.into());
        self
    }

    /// Rendered (with interpolation) instead of the missing-translation
    /// sentinel when no lookup level resolves.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Numeric count: selects the plural form and doubles as the
    /// `count` placeholder value.
    pub fn count(mut self, count: f64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.set(name, value);
        self
    }

    fn effective_values(&self) -> Values {
        let mut values = self.values.clone();
        if let Some(count) = self.count
            && values.get("count").is_none()
        {
            values.set("count", Value::Float(count));
        }
        values
    }
}

/// The translation context: message catalogs plus locale state.
/// Plain data; clone it, pass it, or share it behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Translator {
    translations: Catalog,
    extras: Catalog,
    locale: String,
    fallback_locale: Option<String>,
    default_locale: String,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    pub fn new() -> Self {
        Self {
            translations: Catalog::new(),
            extras: Catalog::new(),
            locale: LAST_RESORT_LOCALE.to_string(),
            fallback_locale: None,
            default_locale: LAST_RESORT_LOCALE.to_string(),
        }
    }

    /// A translator whose default (and initial active) locale is `tag`.
    pub fn with_default_locale(tag: &str) -> Result<Self> {
        let tag = locale::canonicalize(tag)?;
        Ok(Self {
            locale: tag.clone(),
            default_locale: tag,
            ..Self::new()
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, tag: &str) -> Result<()> {
        self.locale = locale::canonicalize(tag)?;
        Ok(())
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn fallback_locale(&self) -> Option<&str> {
        self.fallback_locale.as_deref()
    }

    pub fn set_fallback_locale(&mut self, tag: Option<&str>) -> Result<()> {
        self.fallback_locale = match tag {
            Some(tag) => Some(locale::canonicalize(tag)?),
            None => None,
        };
        Ok(())
    }

    // ------------------------------------------------------------------
    // Catalog population
    // ------------------------------------------------------------------

    pub fn store(&mut self, tag: impl Into<String>, tree: Message) {
        self.translations.store(tag, tree);
    }

    pub fn merge(&mut self, tag: impl Into<String>, tree: Message) {
        self.translations.merge(tag, tree);
    }

    pub fn store_extras(&mut self, tag: impl Into<String>, tree: Message) {
        self.extras.store(tag, tree);
    }

    pub fn merge_extras(&mut self, tag: impl Into<String>, tree: Message) {
        self.extras.merge(tag, tree);
    }

    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        self.translations.load_file(path)
    }

    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<String>> {
        self.translations.load_dir(dir)
    }

    pub fn translations(&self) -> &Catalog {
        &self.translations
    }

    pub fn extras(&self) -> &Catalog {
        &self.extras
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// The locale tags consulted for a call, in order: the requested
    /// locale's truncation chain, then the configured fallback's, then
    /// the default locale's, then the last-resort `"en"`.
    fn candidate_tags(&self, requested: &str) -> Vec<String> {
        let mut tags = locale::fallback_chain(requested);
        if let Some(fallback) = &self.fallback_locale {
            tags.extend(locale::fallback_chain(fallback));
        }
        tags.extend(locale::fallback_chain(&self.default_locale));
        tags.push(LAST_RESORT_LOCALE.to_string());
        let mut seen = Vec::with_capacity(tags.len());
        for tag in tags {
            if !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        seen
    }

    /// Resolve a scope without rendering. Each lookup level checks the
    /// translations tree first, then the extras tree. Returns the tag
    /// whose tree matched alongside the node.
    pub fn lookup(&self, scope: &str, options: &Options) -> Option<(String, &Message)> {
        let requested = options.locale.as_deref().unwrap_or(&self.locale);
        let scope_full = self.join_scope(scope, options);
        for tag in self.candidate_tags(requested) {
            if let Some(node) = self
                .translations
                .resolve(&tag, &scope_full)
                .or_else(|| self.extras.resolve(&tag, &scope_full))
            {
                if tag != requested {
                    debug!(%requested, resolved = %tag, scope = %scope_full, "fallback lookup");
                }
                return Some((tag, node));
            }
        }
        None
    }

    /// Convenience for name tables: resolve a scope to a `List`.
    pub fn list(&self, scope: &str, options: &Options) -> Option<&[String]> {
        self.lookup(scope, options).and_then(|(_, node)| node.as_list())
    }

    fn join_scope(&self, scope: &str, options: &Options) -> String {
        match &options.scope_prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}.{scope}"),
            _ => scope.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Full resolution: lookup, plural selection, interpolation. Soft
    /// failure: missing translations render as `"[<locale>.<scope>]"`,
    /// and missing plural forms count as missing translations.
    pub fn translate(&self, scope: &str, options: &Options) -> String {
        match self.render(scope, options) {
            Some(text) => text,
            None => {
                if let Some(default) = &options.default_value {
                    return interpolate::interpolate(default, &options.effective_values());
                }
                let requested = options.locale.as_deref().unwrap_or(&self.locale);
                let scope_full = self.join_scope(scope, options);
                debug!(locale = %requested, scope = %scope_full, "missing translation");
                format!("[{requested}.{scope_full}]")
            }
        }
    }

    /// `translate` without options.
    pub fn t(&self, scope: &str) -> String {
        self.translate(scope, &Options::default())
    }

    /// Hard-failure variant: a typed error instead of the sentinel. A
    /// `default_value` still takes precedence over the error.
    pub fn try_translate(&self, scope: &str, options: &Options) -> Result<String> {
        match self.render(scope, options) {
            Some(text) => Ok(text),
            None => {
                if let Some(default) = &options.default_value {
                    return Ok(interpolate::interpolate(
                        default,
                        &options.effective_values(),
                    ));
                }
                Err(Error::MissingTranslation {
                    locale: options
                        .locale
                        .clone()
                        .unwrap_or_else(|| self.locale.clone()),
                    scope: self.join_scope(scope, options),
                })
            }
        }
    }

    fn render(&self, scope: &str, options: &Options) -> Option<String> {
        let (resolved_tag, node) = self.lookup(scope, options)?;
        let template = match node {
            Message::Text(text) => text.as_str(),
            Message::Plural(forms) => {
                let category = match options.count {
                    // Without a count a plural node renders its
                    // catch-all form.
                    None => PluralCategory::Other,
                    Some(count) => {
                        if count == 0.0 && forms.contains_key(&PluralCategory::Zero) {
                            PluralCategory::Zero
                        } else {
                            // The matched tree's locale picks the rule,
                            // so an English fallback body pluralizes
                            // with English rules.
                            plural::cardinal_category(&resolved_tag, count)
                        }
                    }
                };
                forms
                    .get(&category)
                    .or_else(|| forms.get(&PluralCategory::Other))?
                    .as_str()
            }
            // Structural nodes (subtrees, name lists) do not render.
            Message::List(_) | Message::Tree(_) => return None,
        };
        Some(interpolate::interpolate(template, &options.effective_values()))
    }
}
