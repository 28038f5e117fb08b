//! Per-language stopword sets.
//!
//! Word lists live in `<resource-dir>/<language>.txt`. Each line holds one
//! candidate word: the first whitespace-delimited token, lowercased and
//! trimmed. Blank lines, lines beginning with whitespace and lines beginning
//! with `|` are comments. This is the layout of the Snowball stopword lists:
//!
//! ```text
//!  | An English stop word list.
//! and            | conjunction
//! they're
//! ```

use std::fs;
use std::path::Path;

use ahash::AHashSet;

use crate::error::Result;

/// A set of lowercase stop words for one language.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StopwordSet {
    language: String,
    words: AHashSet<String>,
}

impl StopwordSet {
    /// Create an empty set for `language`.
    pub fn empty<S: Into<String>>(language: S) -> Self {
        StopwordSet {
            language: language.into(),
            words: AHashSet::new(),
        }
    }

    /// Create a set from an explicit word list. Words are lowercased and trimmed.
    pub fn from_words<S, I, W>(language: S, words: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        StopwordSet {
            language: language.into(),
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Load the word list for `language` from `path`.
    ///
    /// A missing file yields an empty set.
    pub fn from_file<S: Into<String>>(language: S, path: &Path) -> Result<Self> {
        let language = language.into();
        if !path.is_file() {
            log::debug!(
                "no stopword list for {language:?} at {}, using an empty set",
                path.display()
            );
            return Ok(Self::empty(language));
        }

        let content = fs::read_to_string(path)?;
        let words = parse_word_list(&content);
        log::debug!(
            "loaded {} stopwords for {language:?} from {}",
            words.len(),
            path.display()
        );
        Ok(Self::from_words(language, words))
    }

    /// The language tag this set was built for.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether `word` is a stop word.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over the words in no particular order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// Parse a Snowball-style word list into its words.
pub fn parse_word_list(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| {
            !line.trim().is_empty()
                && !line.starts_with(char::is_whitespace)
                && !line.starts_with('|')
        })
        .filter_map(|line| line.split_whitespace().next())
        .map(|word| word.to_lowercase().trim().to_string())
        .filter(|word| !word.is_empty())
        .collect()
}
