//! Locale-keyed display strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Locale used when a requested translation is missing.
pub const FALLBACK_LOCALE: &str = "en";

/// A display string in several locales, keyed by locale tag (`en`, `ru`, …).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the translation for `locale`.
    #[must_use]
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }

    /// Exact lookup, no fallback.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Lookup with fallback to [`FALLBACK_LOCALE`], then to any translation.
    #[must_use]
    pub fn resolve(&self, locale: &str) -> Option<&str> {
        self.get(locale)
            .or_else(|| self.get(FALLBACK_LOCALE))
            .or_else(|| self.0.values().next().map(String::as_str))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(locale, text)` pairs in locale order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(l, t)| (l.into(), t.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fall_back_to_english_when_locale_missing() {
        let text = LocalizedText::new().with("en", "Bar").with("ru", "Бар");
        assert_eq!(text.resolve("de"), Some("Bar"));
        assert_eq!(text.resolve("ru"), Some("Бар"));
    }

    #[test]
    fn should_fall_back_to_any_translation_when_english_missing() {
        let text = LocalizedText::new().with("ru", "Улица");
        assert_eq!(text.get("en"), None);
        assert_eq!(text.resolve("en"), Some("Улица"));
    }

    #[test]
    fn should_resolve_nothing_when_empty() {
        assert_eq!(LocalizedText::new().resolve("en"), None);
    }

    #[test]
    fn should_deserialize_from_inline_toml_table() {
        #[derive(Deserialize)]
        struct Wrapper {
            title: LocalizedText,
        }
        let wrapper: Wrapper = toml::from_str(r#"title = { en = "Ground floor", ru = "Подвал" }"#)
            .unwrap();
        assert_eq!(wrapper.title.get("ru"), Some("Подвал"));
    }
}
