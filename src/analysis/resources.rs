//! Language resource cache for stopword sets and stemmers.
//!
//! Resources are memoized per canonical language tag (trimmed,
//! case-insensitive, ISO codes mapped to names). Construction happens
//! outside the cache lock; when two threads race on an unseen language the
//! first insert wins and every caller gets that canonical instance back.
//!
//! Callers that already hold a stopword set or a stemmer, or that want the
//! feature turned off, go through [`StopperChoice`] / [`StemmerChoice`],
//! which bypass the cache.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use falcata::analysis::resources::ResourceCache;
//!
//! let cache = ResourceCache::global();
//! let a = cache.stopwords("English").unwrap();
//! let b = cache.stopwords(" english ").unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! assert!(a.contains("and"));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::analysis::stemmer::{NoopStemmer, SnowballStemmer, Stemmer, canonical_language};
use crate::analysis::stopwords::{StopwordSet, parse_word_list};
use crate::error::{FalcataError, Result};

/// Stopword lists compiled into the crate, keyed by canonical language.
const BUNDLED_STOPWORDS: &[(&str, &str)] = &[
    ("english", include_str!("../../resources/stopwords/english.txt")),
    ("french", include_str!("../../resources/stopwords/french.txt")),
    ("german", include_str!("../../resources/stopwords/german.txt")),
    ("russian", include_str!("../../resources/stopwords/russian.txt")),
    ("spanish", include_str!("../../resources/stopwords/spanish.txt")),
];

static GLOBAL_CACHE: LazyLock<Arc<ResourceCache>> =
    LazyLock::new(|| Arc::new(ResourceCache::bundled()));

/// The bundled word list of a canonical language tag.
pub fn bundled_word_list(language: &str) -> Option<&'static str> {
    BUNDLED_STOPWORDS
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, content)| *content)
}

/// How stop words interact with stemming when terms are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopperStrategy {
    /// Never filter stop words.
    None,
    /// Drop stop words in both their unstemmed and stemmed forms.
    All,
    /// Keep the unstemmed form of a stop word, drop its stemmed form.
    #[default]
    Stemmed,
}

/// Where the stopword set for a document comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopperChoice {
    /// Look the set up in the resource cache.
    Language(String),
    /// Use a pre-built set as is.
    #[serde(skip)]
    Set(Arc<StopwordSet>),
    /// No stop word filtering.
    Disabled,
}

impl From<&str> for StopperChoice {
    fn from(language: &str) -> Self {
        StopperChoice::Language(language.to_string())
    }
}

impl From<bool> for StopperChoice {
    /// `false` disables filtering; `true` selects English.
    fn from(enabled: bool) -> Self {
        if enabled {
            StopperChoice::Language("english".to_string())
        } else {
            StopperChoice::Disabled
        }
    }
}

/// Where the stemmer for a document comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemmerChoice {
    /// Look the stemmer up in the resource cache (`"none"` disables stemming).
    Language(String),
    /// Use a pre-built stemmer as is.
    #[serde(skip)]
    Custom(Arc<dyn Stemmer>),
    /// No stemming.
    Disabled,
}

impl From<&str> for StemmerChoice {
    fn from(language: &str) -> Self {
        StemmerChoice::Language(language.to_string())
    }
}

/// Process-wide cache of per-language stopword sets and stemmers.
///
/// Word lists come from `<resource_dir>/<language>.txt` when a directory is
/// set, from the lists compiled into the crate otherwise.
pub struct ResourceCache {
    resource_dir: Option<PathBuf>,
    stopwords: RwLock<AHashMap<String, Arc<StopwordSet>>>,
    stemmers: RwLock<AHashMap<String, Arc<dyn Stemmer>>>,
}

impl ResourceCache {
    /// Create a cache that reads word lists from `resource_dir`.
    pub fn new<P: AsRef<Path>>(resource_dir: P) -> Self {
        ResourceCache {
            resource_dir: Some(resource_dir.as_ref().to_path_buf()),
            stopwords: RwLock::new(AHashMap::new()),
            stemmers: RwLock::new(AHashMap::new()),
        }
    }

    /// Create a cache over the bundled word lists.
    pub fn bundled() -> Self {
        ResourceCache {
            resource_dir: None,
            stopwords: RwLock::new(AHashMap::new()),
            stemmers: RwLock::new(AHashMap::new()),
        }
    }

    /// The shared cache over the bundled word lists.
    pub fn global() -> Arc<ResourceCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// Directory the word lists are read from, `None` for the bundled lists.
    pub fn resource_dir(&self) -> Option<&Path> {
        self.resource_dir.as_deref()
    }

    /// Path of the word list for a language tag, when reading from a directory.
    pub fn stopwords_path(&self, language: &str) -> Option<PathBuf> {
        self.resource_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.txt", canonical_language(language))))
    }

    /// Get the stopword set for `language`, loading it on first use.
    ///
    /// A language without a word list yields an empty set.
    pub fn stopwords(&self, language: &str) -> Result<Arc<StopwordSet>> {
        let key = canonical_language(language);
        if let Some(set) = self.stopwords.read().get(&key) {
            return Ok(Arc::clone(set));
        }

        let built = match self.stopwords_path(&key) {
            Some(path) => StopwordSet::from_file(key.clone(), &path)?,
            None => match bundled_word_list(&key) {
                Some(content) => {
                    let words = parse_word_list(content);
                    log::debug!("loaded {} bundled stopwords for {key:?}", words.len());
                    StopwordSet::from_words(key.clone(), words)
                }
                None => StopwordSet::empty(key.clone()),
            },
        };
        let mut cache = self.stopwords.write();
        let canonical = cache.entry(key).or_insert_with(|| Arc::new(built));
        Ok(Arc::clone(canonical))
    }

    /// Get the stemmer for `language`. `"none"` yields the no-op stemmer.
    pub fn stemmer(&self, language: &str) -> Result<Arc<dyn Stemmer>> {
        let key = canonical_language(language);
        if let Some(stemmer) = self.stemmers.read().get(&key) {
            return Ok(Arc::clone(stemmer));
        }

        let built: Arc<dyn Stemmer> = if key == "none" {
            Arc::new(NoopStemmer::new())
        } else {
            match SnowballStemmer::for_language(&key) {
                Some(stemmer) => Arc::new(stemmer),
                None => {
                    return Err(FalcataError::analysis(format!(
                        "no stemmer available for language {key:?}"
                    )));
                }
            }
        };
        log::debug!("built {key:?} stemmer");

        let mut cache = self.stemmers.write();
        let canonical = cache.entry(key).or_insert(built);
        Ok(Arc::clone(canonical))
    }

    /// Resolve a stopper choice. `None` means filtering is disabled.
    pub fn resolve_stopper(&self, choice: &StopperChoice) -> Result<Option<Arc<StopwordSet>>> {
        match choice {
            StopperChoice::Language(language) => self.stopwords(language).map(Some),
            StopperChoice::Set(set) => Ok(Some(Arc::clone(set))),
            StopperChoice::Disabled => Ok(None),
        }
    }

    /// Resolve a stemmer choice. Disabled resolves to the no-op stemmer.
    pub fn resolve_stemmer(&self, choice: &StemmerChoice) -> Result<Arc<dyn Stemmer>> {
        match choice {
            StemmerChoice::Language(language) => self.stemmer(language),
            StemmerChoice::Custom(stemmer) => Ok(Arc::clone(stemmer)),
            StemmerChoice::Disabled => self.stemmer("none"),
        }
    }

    /// Number of cached stopword sets.
    pub fn stopword_sets_cached(&self) -> usize {
        self.stopwords.read().len()
    }
}

impl fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCache")
            .field("resource_dir", &self.resource_dir)
            .field("stopwords", &self.stopwords.read().keys().collect::<Vec<_>>())
            .field("stemmers", &self.stemmers.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_stopwords_for_bundled_languages() {
        let cache = ResourceCache::global();
        let english = cache.stopwords("english").unwrap();
        assert!(english.contains("and"));
        assert!(english.contains("they're"));
        assert!(!english.contains("theremin"));

        for language in ["french", "german", "spanish", "russian"] {
            let set = cache.stopwords(language).unwrap();
            assert!(!set.is_empty(), "{language} should have stop words");
            assert!(!set.contains(""));
            assert!(!set.contains("|"));
        }
        assert!(cache.stopwords("ru").unwrap().contains("человек"));
    }

    #[test]
    fn test_missing_language_is_empty() {
        let cache = ResourceCache::global();
        let set = cache.stopwords("no_existy").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_memoized_and_case_insensitive() {
        let cache = ResourceCache::bundled();
        let a = cache.stopwords("French").unwrap();
        let b = cache.stopwords("fr").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stopword_sets_cached(), 1);

        let s1 = cache.stemmer("FRENCH").unwrap();
        let s2 = cache.stemmer("french ").unwrap();
        assert!(Arc::ptr_eq(&s1, &s2));
    }

    #[test]
    fn test_concurrent_first_access_converges() {
        let cache = Arc::new(ResourceCache::bundled());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.stopwords("english").unwrap())
            })
            .collect();
        let sets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let canonical = cache.stopwords("english").unwrap();
        for set in &sets {
            assert!(Arc::ptr_eq(set, &canonical));
        }
        assert_eq!(cache.stopword_sets_cached(), 1);
    }

    #[test]
    fn test_choices_bypass_cache() {
        let cache = ResourceCache::bundled();

        let custom = Arc::new(StopwordSet::from_words("custom", ["foo"]));
        let resolved = cache
            .resolve_stopper(&StopperChoice::Set(Arc::clone(&custom)))
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&resolved, &custom));
        assert!(cache.resolve_stopper(&StopperChoice::from(false)).unwrap().is_none());
        assert_eq!(cache.stopword_sets_cached(), 0);

        let stemmer = cache.resolve_stemmer(&StemmerChoice::Disabled).unwrap();
        assert!(stemmer.is_noop());
        assert!(cache.stemmer("none").unwrap().is_noop());
    }

    #[test]
    fn test_directory_overrides_bundled_lists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("english.txt"), "zebra\n").unwrap();

        let cache = ResourceCache::new(dir.path());
        assert_eq!(cache.resource_dir(), Some(dir.path()));
        let set = cache.stopwords("en").unwrap();
        assert!(set.contains("zebra"));
        assert!(!set.contains("and"));
        // no file for french in the directory, and no fallback to the bundled list
        assert!(cache.stopwords("french").unwrap().is_empty());

        let bundled = ResourceCache::bundled();
        assert!(bundled.resource_dir().is_none());
        assert!(bundled.stopwords_path("english").is_none());
        assert!(bundled.stopwords("english").unwrap().contains("and"));
        assert!(bundled_word_list("klingon").is_none());
    }

    #[test]
    fn test_unknown_stemmer_language() {
        let cache = ResourceCache::bundled();
        let err = cache.stemmer("klingon").unwrap_err();
        assert!(matches!(err, FalcataError::Analysis(_)));
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&StopperStrategy::Stemmed).unwrap();
        assert_eq!(json, "\"stemmed\"");
        let strategy: StopperStrategy = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(strategy, StopperStrategy::All);
        assert_eq!(StopperStrategy::default(), StopperStrategy::Stemmed);
    }
}
