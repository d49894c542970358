//! Locale identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language tag such as `en-GB`
///
/// Tags are compared case-insensitively and with `_` read as `-`, so
/// `en_gb` and `en-GB` name the same locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// The locale used when the caller has none
    pub const INVARIANT: &'static str = "und";

    pub fn new(tag: impl AsRef<str>) -> Self {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            return Self(Self::INVARIANT.to_string());
        }
        let normalized = tag
            .split(['-', '_'])
            .enumerate()
            .map(|(i, part)| match (i, part.len()) {
                (0, _) => part.to_ascii_lowercase(),
                (_, 2) => part.to_ascii_uppercase(),
                _ => part.to_string(),
            })
            .collect::<Vec<_>>()
            .join("-");
        Self(normalized)
    }

    pub fn invariant() -> Self {
        Self(Self::INVARIANT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag, e.g. `en` for `en-GB`
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(Locale::new("en_gb"), Locale::new("en-GB"));
        assert_eq!(Locale::new("EN-us").as_str(), "en-US");
        assert_eq!(Locale::new("zh-Hant-TW").as_str(), "zh-Hant-TW");
        assert_eq!(Locale::new("  ").as_str(), Locale::INVARIANT);
    }

    #[test]
    fn test_language() {
        assert_eq!(Locale::new("pt-BR").language(), "pt");
        assert_eq!(Locale::new("de").language(), "de");
    }
}
