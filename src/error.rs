use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the library's `Result`-returning API.
///
/// The rendering entry points (`Translator::translate`, the formatting
/// helpers) never return these: they degrade to marker strings so a UI
/// keeps rendering. The `try_*` variants and the catalog loaders use
/// this taxonomy instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid locale tag: {0}")]
    InvalidLocale(String),

    #[error("missing translation: {locale}.{scope}")]
    MissingTranslation { locale: String, scope: String },

    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("failed to read catalog file {path}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog document root must be an object (in {path})")]
    CatalogShape { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
