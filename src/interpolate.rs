use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashMap;

/// A value usable as a placeholder substitution.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn render(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => number_to_string(*n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

/// Named substitution values for one translate call.
#[derive(Clone, Debug, Default)]
pub struct Values {
    entries: FxHashMap<String, Value>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shortest-round-trip rendering for float values, matching how a JS
/// runtime prints numbers (`5.0` → `"5"`, `1.5` → `"1.5"`).
pub fn number_to_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format(x).to_string()
}

/// Matches both placeholder spellings: `{{name}}` and `%{name}`.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}|%\{\s*([^{}]+?)\s*\}").unwrap())
}

/// The placeholder names referenced by a template, in order of first
/// appearance, deduplicated.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in placeholder_re().captures_iter(template) {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|g| g.as_str().to_string())
            .unwrap_or_default();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Replace every placeholder with its value; a placeholder with no
/// matching value becomes an inline `[missing … value]` marker in the
/// same spelling the template used.
///
/// The output is assembled from match offsets and values are spliced
/// verbatim; a replacement-template API would reinterpret `$` in
/// values as capture references.
pub fn interpolate(template: &str, values: &Values) -> String {
    let re = placeholder_re();
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in re.captures_iter(template) {
        let whole = caps.get(0).unwrap();
        out.push_str(&template[last..whole.start()]);
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|g| g.as_str())
            .unwrap_or_default();
        match values.get(name) {
            Some(value) => out.push_str(&value.render()),
            None => {
                if whole.as_str().starts_with("{{") {
                    out.push_str(&format!("[missing {{{{{name}}}}} value]"));
                } else {
                    out.push_str(&format!("[missing %{{{name}}} value]"));
                }
            }
        }
        last = whole.end();
    }
    out.push_str(&template[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, Value)]) -> Values {
        let mut v = Values::new();
        for (name, value) in pairs {
            v.set(*name, value.clone());
        }
        v
    }

    #[test]
    fn double_brace_style() {
        let v = values(&[("name", Value::from("Alice"))]);
        assert_eq!(interpolate("Hello, {{name}}!", &v), "Hello, Alice!");
    }

    #[test]
    fn percent_brace_style() {
        let v = values(&[("name", Value::from("Bob"))]);
        assert_eq!(interpolate("Hello, %{name}!", &v), "Hello, Bob!");
    }

    #[test]
    fn mixed_styles_in_one_template() {
        let v = values(&[("a", Value::from("1")), ("b", Value::from("2"))]);
        assert_eq!(interpolate("{{a}} and %{b}", &v), "1 and 2");
    }

    #[test]
    fn missing_value_marker_mirrors_spelling() {
        let v = Values::new();
        assert_eq!(
            interpolate("Hi {{name}}", &v),
            "Hi [missing {{name}} value]"
        );
        assert_eq!(interpolate("Hi %{name}", &v), "Hi [missing %{name} value]");
    }

    #[test]
    fn dollar_signs_in_values_stay_literal() {
        let v = values(&[("amount", Value::from("$1"))]);
        assert_eq!(interpolate("Pay {{amount}} now", &v), "Pay $1 now");
        let v = values(&[("re", Value::from("$0 ${x} $$"))]);
        assert_eq!(interpolate("{{re}}", &v), "$0 ${x} $$");
    }

    #[test]
    fn repeated_placeholder() {
        let v = values(&[("x", Value::from("A"))]);
        assert_eq!(interpolate("{{x}} and {{x}}", &v), "A and A");
    }

    #[test]
    fn unclosed_braces_pass_through() {
        let v = values(&[("x", Value::from("A"))]);
        assert_eq!(interpolate("{{x", &v), "{{x");
        assert_eq!(interpolate("%{x and more", &v), "%{x and more");
    }

    #[test]
    fn whitespace_inside_braces_is_tolerated() {
        let v = values(&[("name", Value::from("C"))]);
        assert_eq!(interpolate("{{ name }}", &v), "C");
    }

    #[test]
    fn numbers_render_js_style() {
        assert_eq!(number_to_string(5.0), "5");
        assert_eq!(number_to_string(1.5), "1.5");
        assert_eq!(number_to_string(0.0), "0");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::INFINITY), "Infinity");
        let v = values(&[("count", Value::from(3.0))]);
        assert_eq!(interpolate("{{count}} files", &v), "3 files");
    }

    #[test]
    fn names_extraction() {
        assert_eq!(
            placeholder_names("{{a}} %{b} {{a}}"),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(placeholder_names("plain text").is_empty());
    }
}
