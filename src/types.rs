use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde::de::{Deserializer, Error as _};

use crate::plural::PluralCategory;

/// A node in a locale's message tree.
///
/// Catalog documents are plain JSON: strings become `Text`, arrays of
/// strings become `List` (used for name tables such as month names),
/// objects whose keys are all plural-category names become `Plural`,
/// and every other object becomes a nested `Tree`.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Text(String),
    List(Vec<String>),
    Plural(FxHashMap<PluralCategory, String>),
    Tree(FxHashMap<String, Message>),
}

impl Message {
    pub fn empty_tree() -> Self {
        Message::Tree(FxHashMap::default())
    }

    /// Child lookup on a `Tree` node. Any other variant has no children.
    pub fn get(&self, key: &str) -> Option<&Message> {
        match self {
            Message::Tree(children) => children.get(key),
            _ => None,
        }
    }

    /// Walk a dotted scope path from this node.
    ///
    /// An empty path or an empty segment (`"a..b"`) never resolves, and
    /// neither does a path with segments left over once a leaf is hit.
    pub fn walk(&self, scope: &str) -> Option<&Message> {
        if scope.is_empty() {
            return None;
        }
        let mut node = self;
        for segment in scope.split('.') {
            if segment.is_empty() {
                return None;
            }
            node = node.get(segment)?;
        }
        Some(node)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Message::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Message::Tree(_))
    }

    /// Deep-merge `other` into `self`. Trees merge recursively; any
    /// other collision is resolved in favor of `other`.
    pub fn merge_from(&mut self, other: Message) {
        match (self, other) {
            (Message::Tree(dst), Message::Tree(src)) => {
                for (key, value) in src {
                    match dst.get_mut(&key) {
                        Some(existing) => existing.merge_from(value),
                        None => {
                            dst.insert(key, value);
                        }
                    }
                }
            }
            (dst, src) => *dst = src,
        }
    }

    /// Collect the dotted paths of every leaf under this node, sorted.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaves(String::new(), &mut out);
        out.sort_unstable();
        out
    }

    fn collect_leaves(&self, prefix: String, out: &mut Vec<String>) {
        match self {
            Message::Tree(children) => {
                for (key, child) in children {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    child.collect_leaves(path, out);
                }
            }
            _ => out.push(prefix),
        }
    }

    /// Convert a JSON value into a message node.
    ///
    /// `None` means the value carries no message (JSON `null`), which
    /// callers skip rather than store. List slots are the exception:
    /// a `null` element becomes an empty string so positional tables
    /// (1-based month names with a placeholder slot) keep their shape.
    pub fn from_value(value: serde_json::Value) -> std::result::Result<Option<Message>, String> {
        match value {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(s) => Ok(Some(Message::Text(s))),
            serde_json::Value::Bool(b) => Ok(Some(Message::Text(b.to_string()))),
            serde_json::Value::Number(n) => Ok(Some(Message::Text(n.to_string()))),
            serde_json::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::Null => list.push(String::new()),
                        serde_json::Value::String(s) => list.push(s),
                        serde_json::Value::Number(n) => list.push(n.to_string()),
                        other => {
                            return Err(format!("unsupported list element: {}", type_name(&other)));
                        }
                    }
                }
                Ok(Some(Message::List(list)))
            }
            serde_json::Value::Object(fields) => {
                if is_plural_object(&fields) {
                    let mut forms = FxHashMap::default();
                    for (key, value) in fields {
                        if let Some(category) = PluralCategory::from_key(&key)
                            && let serde_json::Value::String(s) = value
                        {
                            forms.insert(category, s);
                        }
                    }
                    return Ok(Some(Message::Plural(forms)));
                }
                let mut children = FxHashMap::default();
                for (key, value) in fields {
                    if let Some(child) = Message::from_value(value)? {
                        children.insert(key, child);
                    }
                }
                Ok(Some(Message::Tree(children)))
            }
        }
    }
}

/// An object is a plural form map when every key names a plural
/// category and every non-null value is a string. `{"one": ...}` alone
/// qualifies; mixing a category key with any other key makes a `Tree`.
fn is_plural_object(fields: &serde_json::Map<String, serde_json::Value>) -> bool {
    if fields.is_empty() {
        return false;
    }
    fields.iter().all(|(key, value)| {
        PluralCategory::from_key(key).is_some()
            && matches!(value, serde_json::Value::String(_) | serde_json::Value::Null)
    })
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match Message::from_value(value) {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(D::Error::custom("null is not a message")),
            Err(msg) => Err(D::Error::custom(msg)),
        }
    }
}
