//! Supported guest languages.
//!
//! The assistant answers in the guest's language. Three languages are
//! supported; English is the baseline that detection falls back to.

use serde::{Deserialize, Serialize};

/// A supported conversation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    German,
    French,
    #[default]
    English,
}

impl Language {
    /// The BCP 47-ish tag used on the wire and in locale fields.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::German => "de",
            Language::French => "fr",
            Language::English => "en",
        }
    }

    /// Parse a locale tag, falling back to English for anything unknown.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "de" | "de-ch" | "de-de" | "de-at" => Language::German,
            "fr" | "fr-fr" | "fr-ch" => Language::French,
            _ => Language::English,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrip() {
        for lang in [Language::German, Language::French, Language::English] {
            assert_eq!(Language::from_tag(lang.tag()), lang);
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_english() {
        assert_eq!(Language::from_tag("it"), Language::English);
        assert_eq!(Language::from_tag(""), Language::English);
    }

    #[test]
    fn regional_variants() {
        assert_eq!(Language::from_tag("de-CH"), Language::German);
        assert_eq!(Language::from_tag("fr-FR"), Language::French);
    }
}
