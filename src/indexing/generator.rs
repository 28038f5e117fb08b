//! Term generation for one document.
//!
//! The [`TermGenerator`] turns a document's fields into the weighted,
//! positional term set handed to the index engine. It reads policy only
//! from the explicit [`IndexConfig`] and the resources it was built with;
//! the document contributes its fields and per-document overrides.
//!
//! For every indexed field value the generator
//!
//! 1. renders the value's index string,
//! 2. tokenizes it (`UnicodeWord → Lowercase → Stop`),
//! 3. emits each word as `X<FIELD>word` and/or `word` depending on the
//!    field flags, plus a `Z`-marked stemmed form without positions,
//! 4. adds the exact-match term for `exact` fields.
//!
//! Boolean fields only produce their zero-weight filter term. After all
//! fields, ASCII-folded duplicates are added when diacritic processing is
//! enabled.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::diacritics::DiacriticFolder;
use crate::analysis::resources::{ResourceCache, StemmerChoice, StopperChoice, StopperStrategy};
use crate::analysis::stemmer::Stemmer;
use crate::analysis::stopwords::StopwordSet;
use crate::analysis::token_filter::{Filter, LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer};
use crate::document::document::Document;
use crate::document::field::{FieldFlags, field_prefix};
use crate::document::field_value::FieldValue;
use crate::error::{FalcataError, Result};
use crate::index::config::IndexConfig;
use crate::indexing::term::TermSet;

/// Marker placed before the field prefix of stemmed terms.
pub const STEM_MARKER: &str = "Z";

/// Whether tokenized terms carry word positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMode {
    Positional,
    NonPositional,
}

impl From<bool> for PositionMode {
    fn from(index_positions: bool) -> Self {
        if index_positions {
            PositionMode::Positional
        } else {
            PositionMode::NonPositional
        }
    }
}

/// Output of one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedTerms {
    /// The document's terms.
    pub terms: TermSet,
    /// Words to record in the spelling dictionary, with occurrence counts.
    pub spellings: BTreeMap<String, u32>,
}

/// Generates the term set of a document under an index configuration.
pub struct TermGenerator<'a> {
    config: &'a IndexConfig,
    stemmer: Arc<dyn Stemmer>,
    stop_filter: Option<StopFilter>,
    strategy: StopperStrategy,
    positions: PositionMode,
    tokenizer: UnicodeWordTokenizer,
    lowercase: LowercaseFilter,
}

impl<'a> TermGenerator<'a> {
    /// Create a generator with explicit resources.
    ///
    /// `stopper` of `None` disables stop word handling. The strategy and
    /// the flags are taken from `config`.
    pub fn new(
        config: &'a IndexConfig,
        stemmer: Arc<dyn Stemmer>,
        stopper: Option<Arc<StopwordSet>>,
    ) -> Self {
        TermGenerator {
            config,
            stemmer,
            stop_filter: stopper.map(StopFilter::new),
            strategy: config.stopper_strategy,
            positions: PositionMode::from(config.index_positions),
            tokenizer: UnicodeWordTokenizer::new().with_cjk_ngrams(config.cjk),
            lowercase: LowercaseFilter::new(),
        }
    }

    /// Create a generator for `doc`, resolving its language resources.
    ///
    /// Each resource is taken from the first of: the document's explicit
    /// choice, the document's language, the index's explicit choice, the
    /// index's language.
    pub fn for_document(
        config: &'a IndexConfig,
        resources: &ResourceCache,
        doc: &Document,
    ) -> Result<Self> {
        let options = doc.options();
        let language = options.language.as_deref();

        let stemmer_choice = match (&options.stemmer, language, &config.stemmer) {
            (Some(choice), _, _) => choice.clone(),
            (None, Some(language), _) => StemmerChoice::from(language),
            (None, None, Some(choice)) => choice.clone(),
            (None, None, None) => StemmerChoice::from(config.language.as_str()),
        };
        let stopper_choice = match (&options.stopper, language, &config.stopper) {
            (Some(choice), _, _) => choice.clone(),
            (None, Some(language), _) => StopperChoice::from(language),
            (None, None, Some(choice)) => choice.clone(),
            (None, None, None) => StopperChoice::from(config.language.as_str()),
        };

        let stemmer = resources.resolve_stemmer(&stemmer_choice)?;
        let stopper = resources.resolve_stopper(&stopper_choice)?;
        let mut generator = TermGenerator::new(config, stemmer, stopper);
        if let Some(strategy) = options.stopper_strategy {
            generator.strategy = strategy;
        }
        Ok(generator)
    }

    /// Override the stopword strategy.
    pub fn with_strategy(mut self, strategy: StopperStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn stemmer(&self) -> &Arc<dyn Stemmer> {
        &self.stemmer
    }

    pub fn strategy(&self) -> StopperStrategy {
        self.strategy
    }

    pub fn position_mode(&self) -> PositionMode {
        self.positions
    }

    /// Generate the terms of `doc`.
    ///
    /// A field whose value has no string form is skipped with a warning;
    /// its siblings are still indexed. Tokenization failures abort the run.
    pub fn generate(&self, doc: &Document) -> Result<GeneratedTerms> {
        let mut out = GeneratedTerms::default();
        let mut position = 0u32;

        for (name, value) in doc.fields() {
            let flags = self.config.flags(name);
            if value.is_null() || (flags.unindexed && !flags.boolean) {
                continue;
            }

            let strings = match index_strings(value, flags) {
                Ok(strings) => strings,
                Err(FalcataError::ValueType(msg)) => {
                    log::warn!("not indexing field {name:?}: {msg}");
                    continue;
                }
                Err(e) => return Err(e),
            };

            // boolean terms are emitted even for unindexed fields
            if flags.boolean {
                let prefix = field_prefix(name);
                for value in &strings {
                    out.terms.add_boolean_term(&prefix, &value.to_lowercase());
                }
                continue;
            }

            self.index_field(doc, name, flags, &strings, &mut position, &mut out)?;
        }

        if self.config.process_diacritics {
            DiacriticFolder::new().process(&mut out.terms);
        }

        log::debug!(
            "generated {} terms for document {:?} ({} stemmer, {:?} stop strategy)",
            out.terms.len(),
            doc.id(),
            self.stemmer.language(),
            self.strategy
        );
        Ok(out)
    }

    fn index_field(
        &self,
        doc: &Document,
        name: &str,
        flags: FieldFlags,
        strings: &[String],
        position: &mut u32,
        out: &mut GeneratedTerms,
    ) -> Result<()> {
        let prefix = field_prefix(name);
        for value in strings {
            let weight = self.weight(name, value, doc);
            if flags.emits_prefixed() {
                self.index_text(value, weight, &prefix, position, out)?;
            }
            if flags.emits_unprefixed() {
                self.index_text(value, weight, "", position, out)?;
            }
            if flags.exact {
                out.terms.add_term(&prefix, &value.to_lowercase(), weight);
            }
        }
        Ok(())
    }

    /// Weight of one field value: weighting function, then the static
    /// table, then 1.
    fn weight(&self, name: &str, value: &str, doc: &Document) -> u32 {
        match &self.config.weights_function {
            Some(weights) => weights.weight(name, value, doc),
            None => self.config.field_weights.get(name).copied().unwrap_or(1),
        }
    }

    /// Tokenize `text` and add its terms under `prefix`.
    ///
    /// Positions continue from `position`, which is advanced past the
    /// words of `text`.
    pub fn index_text(
        &self,
        text: &str,
        weight: u32,
        prefix: &str,
        position: &mut u32,
        out: &mut GeneratedTerms,
    ) -> Result<()> {
        let mut tokens = self.lowercase.filter(self.tokenizer.tokenize(text)?)?;
        if let Some(stop_filter) = &self.stop_filter {
            tokens = stop_filter.filter(tokens)?;
        }

        let stem_prefix = format!("{STEM_MARKER}{prefix}");
        let stemming = !self.stemmer.is_noop();
        let base = *position;
        let mut consumed = 0u32;

        for token in tokens {
            let offset = u32::try_from(token.position).unwrap_or(u32::MAX);
            consumed = consumed.max(offset.saturating_add(1));

            let stopped = token.is_stopped() && self.strategy != StopperStrategy::None;
            if stopped && self.strategy == StopperStrategy::All {
                continue;
            }

            match self.positions {
                PositionMode::Positional => {
                    let pos = base.saturating_add(offset).saturating_add(1);
                    out.terms.add_posting(prefix, &token.text, pos, weight);
                }
                PositionMode::NonPositional => out.terms.add_term(prefix, &token.text, weight),
            }
            if self.config.spelling && prefix.is_empty() {
                *out.spellings.entry(token.text.clone()).or_insert(0) += 1;
            }

            if stemming && !stopped && token.is_stemmable() {
                let stem = self.stemmer.stem(&token.text);
                out.terms.add_term(&stem_prefix, &stem, weight);
            }
        }

        *position = base.saturating_add(consumed);
        Ok(())
    }
}

/// The index strings of a field value: one per element for array fields,
/// a single string otherwise.
fn index_strings(value: &FieldValue, flags: FieldFlags) -> Result<Vec<String>> {
    if flags.array || flags.boolean {
        value
            .elements()
            .into_iter()
            .filter(|v| !v.is_null())
            .map(FieldValue::index_string)
            .collect()
    } else {
        Ok(vec![value.index_string()?])
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::analysis::stemmer::NoopStemmer;
    use crate::document::field::{FieldSpec, FieldType};
    use crate::index::config::WeightsFunction;

    fn generate(config: &IndexConfig, doc: &Document) -> GeneratedTerms {
        TermGenerator::for_document(config, &ResourceCache::global(), doc)
            .unwrap()
            .generate(doc)
            .unwrap()
    }

    fn names(generated: &GeneratedTerms) -> Vec<&str> {
        generated.terms.names().collect()
    }

    #[test]
    fn test_prefixed_and_unprefixed_terms() {
        let config = IndexConfig::default();
        let doc = Document::builder().add_text("name", "John").build();
        let generated = generate(&config, &doc);

        let john = generated.terms.get("john").unwrap();
        assert_eq!(john.weight, 1);
        assert_eq!(john.positions, vec![2]);
        let prefixed = generated.terms.get("XNAMEjohn").unwrap();
        assert_eq!(prefixed.positions, vec![1]);
        assert!(generated.terms.contains("ZXNAMEjohn"));
        assert!(!generated.terms.get("Zjohn").unwrap().has_positions());
    }

    #[test]
    fn test_prefix_flags() {
        let config = IndexConfig::default()
            .with_field(FieldSpec::new("name", FieldType::Text).without_field_name());
        let doc = Document::builder().add_text("name", "john").build();
        let generated = generate(&config, &doc);
        assert!(generated.terms.contains("john"));
        assert!(!generated.terms.contains("XNAMEjohn"));

        let config = IndexConfig::default()
            .with_field(FieldSpec::new("name", FieldType::Text).field_name_only());
        let generated = generate(&config, &doc);
        assert!(generated.terms.contains("XNAMEjohn"));
        assert!(!generated.terms.contains("john"));
    }

    #[test]
    fn test_french_stemmed_strategy() {
        let config = IndexConfig::default()
            .with_language("french")
            .with_field(FieldSpec::new("text", FieldType::Text).without_field_name());
        let doc = Document::builder().add_text("text", "avec and").build();
        let generated = generate(&config, &doc);

        assert!(generated.terms.contains("avec"));
        assert!(!generated.terms.contains("Zavec"));
        assert!(generated.terms.contains("and"));
        assert!(generated.terms.contains("Zand"));
    }

    #[test]
    fn test_stop_strategies() {
        let config = IndexConfig::default()
            .with_language("french")
            .with_field(FieldSpec::new("text", FieldType::Text).without_field_name());
        let doc = Document::builder()
            .add_text("text", "avec contournait")
            .stopper_strategy(StopperStrategy::All)
            .build();
        let generated = generate(&config, &doc);
        assert!(!generated.terms.contains("avec"));
        assert!(!generated.terms.contains("Zavec"));
        assert!(generated.terms.contains("Zcontourn"));
        // the stopped word still occupies position 1
        assert_eq!(generated.terms.get("contournait").unwrap().positions, vec![2]);

        let config = config.with_stopper_strategy(StopperStrategy::None);
        let doc = Document::builder().add_text("text", "avec").build();
        let generated = generate(&config, &doc);
        assert!(generated.terms.contains("avec"));
        assert!(generated.terms.contains("Zavec"));
    }

    #[test]
    fn test_document_language_overrides_index() {
        let config = IndexConfig::default()
            .with_field(FieldSpec::new("text", FieldType::Text).without_field_name());
        let doc = Document::builder()
            .add_text("text", "contournait")
            .language("fr")
            .build();
        let generated = generate(&config, &doc);
        assert!(generated.terms.contains("Zcontourn"));

        let doc = Document::builder()
            .add_text("text", "fishing")
            .stemmer(StemmerChoice::Disabled)
            .build();
        let generated = generate(&config, &doc);
        assert_eq!(names(&generated), vec!["fishing"]);
    }

    #[test]
    fn test_weighting_precedence() {
        let doc = Document::builder()
            .add_text("title", "rust")
            .add_text("body", "rust")
            .build();

        let config = IndexConfig::default()
            .with_field(FieldSpec::new("title", FieldType::Text).field_name_only())
            .with_field(FieldSpec::new("body", FieldType::Text).field_name_only())
            .with_field_weight("title", 5);
        let generated = generate(&config, &doc);
        assert_eq!(generated.terms.get("XTITLErust").unwrap().weight, 5);
        assert_eq!(generated.terms.get("XBODYrust").unwrap().weight, 1);

        let config = config.with_weights_function(WeightsFunction::new(|field, _, _| {
            if field == "title" { 2 } else { 7 }
        }));
        let generated = generate(&config, &doc);
        assert_eq!(generated.terms.get("XTITLErust").unwrap().weight, 2);
        assert_eq!(generated.terms.get("XBODYrust").unwrap().weight, 7);
    }

    #[test]
    fn test_boolean_field() {
        let config = IndexConfig::default()
            .with_field(FieldSpec::new("status", FieldType::Text).boolean());
        let doc = Document::builder().add_text("status", "Active").build();
        let generated = generate(&config, &doc);

        assert_eq!(names(&generated), vec!["XSTATUSactive"]);
        let term = generated.terms.get("XSTATUSactive").unwrap();
        assert_eq!(term.weight, 0);
        assert!(!term.has_positions());
    }

    #[test]
    fn test_unindexed_boolean_field_keeps_filter_terms() {
        let config = IndexConfig::default()
            .with_field(FieldSpec::new("status", FieldType::Text).boolean().unindexed())
            .with_field(FieldSpec::new("tags", FieldType::Text).array().boolean().unindexed());
        let doc = Document::builder()
            .add_text("status", "Active")
            .add_array("tags", ["Red", "Blue"])
            .build();
        let generated = generate(&config, &doc);

        assert_eq!(
            names(&generated),
            vec!["XSTATUSactive", "XTAGSblue", "XTAGSred"]
        );
        assert!(generated.terms.iter().all(|term| term.weight == 0));
    }

    #[test]
    fn test_exact_and_array_fields() {
        let config = IndexConfig::default()
            .with_field(FieldSpec::new("title", FieldType::Text).exact().field_name_only())
            .with_field(FieldSpec::new("tags", FieldType::Text).array().exact().field_name_only());
        let doc = Document::builder()
            .add_text("title", "Hello World")
            .add_array("tags", ["Rust Lang", "Search"])
            .build();
        let generated = generate(&config, &doc);

        assert!(generated.terms.contains("XTITLEhello world"));
        assert!(generated.terms.contains("XTITLEhello"));
        assert!(generated.terms.contains("XTAGSrust lang"));
        assert!(generated.terms.contains("XTAGSsearch"));
        assert!(!generated.terms.contains("XTAGSrust lang search"));
    }

    #[test]
    fn test_unindexed_and_unconvertible_fields() {
        let config = IndexConfig::default()
            .with_field(FieldSpec::new("secret", FieldType::Text).unindexed());
        let doc = Document::builder()
            .add_text("secret", "hidden")
            .add_field("blob", FieldValue::Binary(vec![0xff, 0xfe]))
            .add_text("body", "visible")
            .build();
        let generated = generate(&config, &doc);

        assert!(!generated.terms.names().any(|t| t.contains("hidden")));
        assert!(!generated.terms.names().any(|t| t.starts_with("XBLOB")));
        assert!(generated.terms.contains("visible"));
    }

    #[test]
    fn test_non_positional_mode() {
        let mut config = IndexConfig::default();
        config.index_positions = false;
        let doc = Document::builder().add_text("body", "one two").build();
        let generator =
            TermGenerator::new(&config, Arc::new(NoopStemmer::new()), None);
        assert_eq!(generator.position_mode(), PositionMode::NonPositional);

        let generated = generator.generate(&doc).unwrap();
        assert!(generated.terms.iter().all(|t| !t.has_positions()));
        assert_eq!(generated.terms.get("one").unwrap().weight, 1);
    }

    #[test]
    fn test_diacritic_folding() {
        let config = IndexConfig::default()
            .with_field(FieldSpec::new("body", FieldType::Text).without_field_name());
        let doc = Document::builder().add_text("body", "café café").build();
        let generated = generate(&config, &doc);

        let original = generated.terms.get("café").unwrap();
        let folded = generated.terms.get("cafe").unwrap();
        assert_eq!(original.weight, 2);
        assert_eq!(folded.weight, original.weight);
        assert!(!folded.has_positions());

        let mut config = config;
        config.process_diacritics = false;
        assert!(!generate(&config, &doc).terms.contains("cafe"));
    }

    #[test]
    fn test_cjk_ngrams() {
        let mut config = IndexConfig::default()
            .with_field(FieldSpec::new("body", FieldType::Text).without_field_name());
        config.cjk = true;
        let doc = Document::builder().add_text("body", "生日快乐").build();
        let generated = generate(&config, &doc);

        for term in ["生日", "快乐", "生", "乐"] {
            assert!(generated.terms.contains(term), "missing {term}");
        }
    }

    #[test]
    fn test_datetime_index_string() {
        let config = IndexConfig::default();
        let doc = Document::builder()
            .add_datetime("born", Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 30).unwrap())
            .build();
        let generated = generate(&config, &doc);
        assert!(generated.terms.contains("XBORN20240309140530"));
    }

    #[test]
    fn test_spellings_only_for_unprefixed_words() {
        let config = IndexConfig::default();
        let doc = Document::builder().add_text("body", "Rust rust").build();
        let generated = generate(&config, &doc);
        assert_eq!(generated.spellings.get("rust"), Some(&2));
        assert_eq!(generated.spellings.len(), 1);

        let mut config = config;
        config.spelling = false;
        assert!(generate(&config, &doc).spellings.is_empty());
    }

    #[test]
    fn test_generation_is_idempotent() {
        let config = IndexConfig::default();
        let doc = Document::builder()
            .add_text("title", "Crème brûlée")
            .add_integer("year", 2024)
            .build();
        assert_eq!(generate(&config, &doc), generate(&config, &doc));
    }
}
