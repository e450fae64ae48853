//! Locale string catalog — the `i18n.json` document.
//!
//! # Format
//!
//! ```json
//! {
//!   "en": { "welcome_title": "Welcome!", "welcome_body": "Glad you're here." },
//!   "de": { "welcome_title": "Willkommen!", "welcome_body": "Schön, dass du da bist." }
//! }
//! ```
//!
//! Values may nest arbitrarily; templates address them as `{{ t.section.key }}`.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{io_err, RenderError};

/// Per-locale string tables, keyed by locale code.
#[derive(Debug, Clone, Default)]
pub struct LocaleCatalog {
    locales: BTreeMap<String, Value>,
}

impl LocaleCatalog {
    /// Load the catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let locales: BTreeMap<String, Value> = serde_json::from_str(&contents)?;
        Ok(Self { locales })
    }

    /// Build a catalog from in-memory tables. Used in tests.
    pub fn from_map(locales: BTreeMap<String, Value>) -> Self {
        Self { locales }
    }

    /// The string table for `locale`.
    pub fn strings(&self, locale: &str) -> Result<&Value, RenderError> {
        self.locales.get(locale).ok_or_else(|| RenderError::UnknownLocale {
            locale: locale.to_string(),
        })
    }

    /// All locale codes present in the catalog, sorted.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_and_lookup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("i18n.json");
        std::fs::write(
            &path,
            r#"{"en": {"greeting": "hello"}, "de": {"greeting": "hallo"}}"#,
        )
        .unwrap();

        let catalog = LocaleCatalog::load(&path).expect("load");
        assert_eq!(catalog.locales().collect::<Vec<_>>(), vec!["de", "en"]);
        assert_eq!(catalog.strings("en").unwrap()["greeting"], "hello");
    }

    #[test]
    fn unknown_locale_is_a_typed_error() {
        let catalog = LocaleCatalog::default();
        let err = catalog.strings("fr").unwrap_err();
        assert!(matches!(err, RenderError::UnknownLocale { .. }), "got: {err}");
        assert!(err.to_string().contains("'fr'"));
    }

    #[test]
    fn missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.json");
        let err = LocaleCatalog::load(&path).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }), "got: {err}");
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("i18n.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = LocaleCatalog::load(&path).unwrap_err();
        assert!(matches!(err, RenderError::Json(_)), "got: {err}");
    }
}
