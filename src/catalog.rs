use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::locale;
use crate::types::Message;

/// Per-locale message trees, immutable at lookup time. Mutation happens
/// through the explicit `store`/`merge`/`load_*` calls, normally all at
/// startup.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    locales: FxHashMap<String, Message>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locale's tree, replacing any previous tree wholesale.
    pub fn store(&mut self, tag: impl Into<String>, tree: Message) {
        let tag = tag.into();
        debug!(locale = %tag, "storing locale tree");
        self.locales.insert(tag, tree);
    }

    /// Deep-merge a tree into a locale, creating the locale if absent.
    /// This is the incremental update path; later values win.
    pub fn merge(&mut self, tag: impl Into<String>, tree: Message) {
        let tag = tag.into();
        match self.locales.get_mut(&tag) {
            Some(existing) => existing.merge_from(tree),
            None => {
                self.locales.insert(tag, tree);
            }
        }
    }

    /// Load one `<locale>.json` document; the file stem names the
    /// locale. Returns the canonical tag the document was merged under.
    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let tag = locale::canonicalize(stem)?;
        let text = fs::read_to_string(path).map_err(|source| Error::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let tree: Message =
            serde_json::from_str(&text).map_err(|source| Error::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;
        if !matches!(tree, Message::Tree(_)) {
            return Err(Error::CatalogShape {
                path: path.to_path_buf(),
            });
        }
        self.merge(tag.clone(), tree);
        Ok(tag)
    }

    /// Load every `*.json` document in a directory. Files whose stem is
    /// not a locale tag are skipped with a warning; unreadable or
    /// malformed documents abort the load.
    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<String>> {
        let entries = fs::read_dir(dir).map_err(|source| Error::CatalogIo {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut loaded = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::CatalogIo {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            if !locale::is_valid(stem) {
                warn!(file = %path.display(), "skipping file: stem is not a locale tag");
                continue;
            }
            loaded.push(self.load_file(&path)?);
        }
        loaded.sort_unstable();
        Ok(loaded)
    }

    /// Walk a dotted scope path through one locale's tree.
    pub fn resolve(&self, tag: &str, scope: &str) -> Option<&Message> {
        self.locales.get(tag)?.walk(scope)
    }

    pub fn contains_locale(&self, tag: &str) -> bool {
        self.locales.contains_key(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Registered locale tags, sorted.
    pub fn locales(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.locales.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Dotted paths of every leaf in one locale, sorted. Empty for an
    /// unknown locale.
    pub fn keys(&self, tag: &str) -> Vec<String> {
        self.locales
            .get(tag)
            .map(Message::leaf_paths)
            .unwrap_or_default()
    }

    pub fn tree(&self, tag: &str) -> Option<&Message> {
        self.locales.get(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: &str) -> Message {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn store_then_resolve() {
        let mut catalog = Catalog::new();
        catalog.store("en", tree(r#"{"greeting": "Hello", "ui": {"save": "Save"}}"#));
        assert_eq!(
            catalog.resolve("en", "ui.save").and_then(Message::as_text),
            Some("Save")
        );
        assert!(catalog.resolve("en", "ui.load").is_none());
        assert!(catalog.resolve("fr", "greeting").is_none());
    }

    #[test]
    fn store_replaces_wholesale() {
        let mut catalog = Catalog::new();
        catalog.store("en", tree(r#"{"a": "1", "b": "2"}"#));
        catalog.store("en", tree(r#"{"a": "3"}"#));
        assert!(catalog.resolve("en", "b").is_none());
        assert_eq!(
            catalog.resolve("en", "a").and_then(Message::as_text),
            Some("3")
        );
    }

    #[test]
    fn merge_is_incremental() {
        let mut catalog = Catalog::new();
        catalog.store("en", tree(r#"{"a": "1", "b": "2"}"#));
        catalog.merge("en", tree(r#"{"a": "3"}"#));
        assert_eq!(
            catalog.resolve("en", "a").and_then(Message::as_text),
            Some("3")
        );
        assert_eq!(
            catalog.resolve("en", "b").and_then(Message::as_text),
            Some("2")
        );
    }

    #[test]
    fn locales_and_keys_sorted() {
        let mut catalog = Catalog::new();
        catalog.store("fr", tree(r#"{"z": "1", "a": {"b": "2"}}"#));
        catalog.store("en", tree(r#"{"x": "1"}"#));
        assert_eq!(catalog.locales(), vec!["en", "fr"]);
        assert_eq!(catalog.keys("fr"), vec!["a.b", "z"]);
        assert!(catalog.keys("de").is_empty());
    }

    #[test]
    fn load_dir_reads_documents() {
        let dir = std::env::temp_dir().join("lingo-catalog-test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("en.json"), r#"{"hello": "Hello"}"#).unwrap();
        fs::write(dir.join("pt-BR.json"), r#"{"hello": "Olá"}"#).unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::write(dir.join("not a tag.json"), "{}").unwrap();

        let mut catalog = Catalog::new();
        let loaded = catalog.load_dir(&dir).unwrap();
        assert_eq!(loaded, vec!["en", "pt-BR"]);
        assert_eq!(
            catalog.resolve("pt-BR", "hello").and_then(Message::as_text),
            Some("Olá")
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_file_rejects_non_object_root() {
        let dir = std::env::temp_dir().join("lingo-catalog-root-test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("en.json"), r#""just a string""#).unwrap();
        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.load_file(&dir.join("en.json")),
            Err(Error::CatalogShape { .. })
        ));
        fs::remove_dir_all(&dir).unwrap();
    }
}
