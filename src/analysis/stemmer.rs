//! Stemmers that reduce a word to its root form.
//!
//! Language tags are resolved the way the index configuration accepts them:
//! either the English name of the language (`"french"`) or its two-letter
//! ISO 639 code (`"fr"`), case-insensitive. `"none"` (or an empty tag)
//! selects the [`NoopStemmer`].
//!
//! # Examples
//!
//! ```
//! use falcata::analysis::stemmer::{SnowballStemmer, Stemmer};
//!
//! let stemmer = SnowballStemmer::for_language("fr").unwrap();
//! assert_eq!(stemmer.stem("contournait"), "contourn");
//! assert_eq!(stemmer.language(), "french");
//! ```

use std::fmt;

use rust_stemmers::Algorithm;

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync + fmt::Debug {
    /// Stem a lowercase word to its root form.
    fn stem(&self, word: &str) -> String;

    /// The canonical language name of this stemmer, or `"none"`.
    fn language(&self) -> &str;

    /// Whether this stemmer changes words at all.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Normalize a language tag: trimmed, lowercased, ISO codes mapped to names.
pub fn canonical_language(tag: &str) -> String {
    let tag = tag.trim().to_lowercase();
    let name = match tag.as_str() {
        "ar" => "arabic",
        "da" => "danish",
        "nl" => "dutch",
        "en" => "english",
        "fi" => "finnish",
        "fr" => "french",
        "de" => "german",
        "el" => "greek",
        "hu" => "hungarian",
        "it" => "italian",
        "nb" | "nn" | "no" => "norwegian",
        "pt" => "portuguese",
        "ro" => "romanian",
        "ru" => "russian",
        "es" => "spanish",
        "sv" => "swedish",
        "ta" => "tamil",
        "tr" => "turkish",
        "" => "none",
        _ => return tag,
    };
    name.to_string()
}

fn algorithm_for(language: &str) -> Option<Algorithm> {
    let algorithm = match language {
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "finnish" => Algorithm::Finnish,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        _ => return None,
    };
    Some(algorithm)
}

/// Snowball stemmer for one language.
pub struct SnowballStemmer {
    language: String,
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    /// Build the Snowball stemmer for a language tag.
    ///
    /// Returns `None` when the tag names no Snowball algorithm (this
    /// includes `"none"`).
    pub fn for_language(tag: &str) -> Option<Self> {
        let language = canonical_language(tag);
        let algorithm = algorithm_for(&language)?;
        Some(SnowballStemmer {
            language,
            inner: rust_stemmers::Stemmer::create(algorithm),
        })
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        self.inner.stem(word).into_owned()
    }

    fn language(&self) -> &str {
        &self.language
    }
}

impl fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballStemmer")
            .field("language", &self.language)
            .finish()
    }
}

/// The "none" stemmer: returns words unchanged.
#[derive(Debug, Clone, Default)]
pub struct NoopStemmer;

impl NoopStemmer {
    pub fn new() -> Self {
        NoopStemmer
    }
}

impl Stemmer for NoopStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }

    fn language(&self) -> &str {
        "none"
    }

    fn is_noop(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_language() {
        assert_eq!(canonical_language(" English "), "english");
        assert_eq!(canonical_language("FR"), "french");
        assert_eq!(canonical_language(""), "none");
        assert_eq!(canonical_language("klingon"), "klingon");
    }

    #[test]
    fn test_english_stemmer() {
        let stemmer = SnowballStemmer::for_language("english").unwrap();
        assert_eq!(stemmer.stem("fishing"), "fish");
        assert_eq!(stemmer.stem("running"), "run");
        assert!(!stemmer.is_noop());
    }

    #[test]
    fn test_french_stemmer() {
        let stemmer = SnowballStemmer::for_language("french").unwrap();
        assert_eq!(stemmer.stem("contournait"), "contourn");
        assert_eq!(stemmer.stem("avec"), "avec");
    }

    #[test]
    fn test_none_and_unknown() {
        assert!(SnowballStemmer::for_language("none").is_none());
        assert!(SnowballStemmer::for_language("klingon").is_none());
    }

    #[test]
    fn test_noop_stemmer() {
        let stemmer = NoopStemmer::new();
        assert_eq!(stemmer.stem("fishing"), "fishing");
        assert_eq!(stemmer.language(), "none");
        assert!(stemmer.is_noop());
    }
}
