//! A localization runtime: message catalogs with locale-chain
//! fallback, placeholder interpolation, CLDR pluralization, localized
//! date/time rendering, and IANA timezone resolution.
//!
//! The commodity layers are deliberately not reimplemented here:
//! calendar math comes from `chrono`, timezone rules from `chrono-tz`
//! (compiled IANA tzdata), plural rules and locale handling from `icu`
//! (CLDR). This crate is the runtime on top, the part an application
//! actually authors: which message wins, which plural form applies,
//! what a placeholder expands to.
//!
//! All state lives in an explicit [`Translator`] value; there is no
//! process-global locale.
//!
//! ```
//! use lingo::{Message, Options, Translator};
//!
//! let mut tr = Translator::new();
//! let en: Message = serde_json::from_str(
//!     r#"{"inbox": {"one": "1 message", "other": "{{count}} messages"}}"#,
//! ).unwrap();
//! tr.store("en", en);
//!
//! assert_eq!(tr.translate("inbox", &Options::new().count(3.0)), "3 messages");
//! assert_eq!(tr.t("nope"), "[en.nope]");
//! ```

pub mod catalog;
pub mod datetime;
pub mod error;
pub mod interpolate;
pub mod locale;
pub mod plural;
pub mod report;
pub mod timezone;
pub mod translator;
pub mod types;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use interpolate::{Value, Values};
pub use plural::PluralCategory;
pub use timezone::Zone;
pub use translator::{Options, Translator};
pub use types::Message;
