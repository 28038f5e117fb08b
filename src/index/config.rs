//! Configuration for an index.
//!
//! [`IndexConfig`] holds every policy knob the term generator and the value
//! storage read: language resources, the stopword strategy, indexing flags,
//! field declarations, static weights and the lists of stored, sortable and
//! collapsible fields. Everything except the weighting function is
//! serialisable.
//!
//! # Example
//!
//! ```
//! use falcata::document::field::{FieldSpec, FieldType};
//! use falcata::index::config::IndexConfig;
//!
//! let config = IndexConfig::default()
//!     .with_field(FieldSpec::new("status", FieldType::Text).boolean())
//!     .with_field_weight("title", 5)
//!     .with_sortable("created_at");
//!
//! let json = config.to_json().unwrap();
//! let parsed = IndexConfig::from_json(&json).unwrap();
//! assert!(parsed.flags("status").boolean);
//! assert_eq!(parsed.field_weights.get("title"), Some(&5));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::resources::{StemmerChoice, StopperChoice, StopperStrategy};
use crate::document::document::Document;
use crate::document::field::{FieldFlags, FieldSpec, FieldType};
use crate::error::Result;

/// Language used when neither a document nor the index names one.
pub const DEFAULT_LANGUAGE: &str = "english";

/// Caller-supplied weighting: `(field name, index string of the value, document) -> weight`.
#[derive(Clone)]
pub struct WeightsFunction(Arc<dyn Fn(&str, &str, &Document) -> u32 + Send + Sync>);

impl WeightsFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &str, &Document) -> u32 + Send + Sync + 'static,
    {
        WeightsFunction(Arc::new(f))
    }

    /// Evaluate the weight of one field value.
    pub fn weight(&self, field: &str, value: &str, document: &Document) -> u32 {
        (self.0)(field, value, document)
    }
}

impl fmt::Debug for WeightsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeightsFunction")
    }
}

/// Index-wide indexing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Language for stemming and stop words when nothing more specific is set.
    pub language: String,

    /// Stemmer override; defaults to the stemmer of `language`.
    pub stemmer: Option<StemmerChoice>,

    /// Stopword set override; defaults to the list of `language`.
    pub stopper: Option<StopperChoice>,

    /// How stop words interact with stemming.
    pub stopper_strategy: StopperStrategy,

    /// Attach word positions to tokenized terms.
    pub index_positions: bool,

    /// Add ASCII-folded duplicates of terms with diacritics.
    pub process_diacritics: bool,

    /// Record indexed words in the engine's spelling dictionary.
    pub spelling: bool,

    /// Index CJK runs as unigrams and bigrams.
    pub cjk: bool,

    /// Field declarations. Undeclared fields are indexed as text with default flags.
    pub fields: Vec<FieldSpec>,

    /// Static weight per field. Fields not listed weigh 1.
    pub field_weights: BTreeMap<String, u32>,

    /// Fields whose values are stored with the document and returned by lookups.
    pub store: Vec<String>,

    /// Fields stored as values for sorting.
    pub sortable: Vec<String>,

    /// Fields stored as values for collapsing.
    pub collapsible: Vec<String>,

    /// Directory of the `<language>.txt` stopword lists. Defaults to the bundled lists.
    pub resource_dir: Option<PathBuf>,

    /// Weighting function, consulted before `field_weights`.
    #[serde(skip)]
    pub weights_function: Option<WeightsFunction>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            language: DEFAULT_LANGUAGE.to_string(),
            stemmer: None,
            stopper: None,
            stopper_strategy: StopperStrategy::default(),
            index_positions: true,
            process_diacritics: true,
            spelling: true,
            cjk: false,
            fields: Vec::new(),
            field_weights: BTreeMap::new(),
            store: Vec::new(),
            sortable: Vec::new(),
            collapsible: Vec::new(),
            resource_dir: None,
            weights_function: None,
        }
    }
}

impl IndexConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialise the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The declaration of a field.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Declared type of a field, `None` when undeclared.
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.field(name).map(|spec| spec.field_type)
    }

    /// Flags of a field; default flags when undeclared.
    pub fn flags(&self, name: &str) -> FieldFlags {
        self.field(name).map(|spec| spec.flags).unwrap_or_default()
    }

    /// Fields stored as values: sortable then collapsible, without duplicates.
    pub fn value_fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.sortable.iter().chain(&self.collapsible) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Whether a field's value is kept with the stored document.
    pub fn is_stored(&self, name: &str) -> bool {
        self.store.iter().any(|stored| stored == name)
    }

    /// Add or replace a field declaration.
    pub fn with_field(mut self, spec: FieldSpec) -> Self {
        self.fields.retain(|existing| existing.name != spec.name);
        self.fields.push(spec);
        self
    }

    pub fn with_field_weight<S: Into<String>>(mut self, name: S, weight: u32) -> Self {
        self.field_weights.insert(name.into(), weight);
        self
    }

    pub fn with_weights_function(mut self, weights: WeightsFunction) -> Self {
        self.weights_function = Some(weights);
        self
    }

    pub fn with_language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_stemmer<C: Into<StemmerChoice>>(mut self, stemmer: C) -> Self {
        self.stemmer = Some(stemmer.into());
        self
    }

    pub fn with_stopper<C: Into<StopperChoice>>(mut self, stopper: C) -> Self {
        self.stopper = Some(stopper.into());
        self
    }

    pub fn with_stopper_strategy(mut self, strategy: StopperStrategy) -> Self {
        self.stopper_strategy = strategy;
        self
    }

    pub fn with_store<S: Into<String>>(mut self, name: S) -> Self {
        self.store.push(name.into());
        self
    }

    pub fn with_sortable<S: Into<String>>(mut self, name: S) -> Self {
        self.sortable.push(name.into());
        self
    }

    pub fn with_collapsible<S: Into<String>>(mut self, name: S) -> Self {
        self.collapsible.push(name.into());
        self
    }

    pub fn with_resource_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.language, "english");
        assert!(config.index_positions);
        assert!(config.process_diacritics);
        assert_eq!(config.stopper_strategy, StopperStrategy::Stemmed);
        assert_eq!(config.flags("anything"), FieldFlags::default());
        assert_eq!(config.field_type("anything"), None);
    }

    #[test]
    fn test_from_json_partial() {
        let config = IndexConfig::from_json(
            r#"{
                "language": "french",
                "stopper_strategy": "all",
                "cjk": true,
                "fields": [{"name": "age", "type": "integer"}],
                "stopper": "disabled"
            }"#,
        )
        .unwrap();

        assert_eq!(config.language, "french");
        assert_eq!(config.stopper_strategy, StopperStrategy::All);
        assert!(config.cjk);
        assert!(config.index_positions);
        assert_eq!(config.field_type("age"), Some(FieldType::Integer));
        assert!(matches!(config.stopper, Some(StopperChoice::Disabled)));
    }

    #[test]
    fn test_value_fields_union() {
        let config = IndexConfig::default()
            .with_sortable("price")
            .with_sortable("created_at")
            .with_collapsible("site")
            .with_collapsible("price");

        assert_eq!(config.value_fields(), vec!["price", "created_at", "site"]);
    }

    #[test]
    fn test_with_field_replaces() {
        let config = IndexConfig::default()
            .with_field(FieldSpec::new("tags", FieldType::Text))
            .with_field(FieldSpec::new("tags", FieldType::Text).array());

        assert_eq!(config.fields.len(), 1);
        assert!(config.flags("tags").array);
    }

    #[test]
    fn test_weights_function_is_not_serialised() {
        let config = IndexConfig::default()
            .with_weights_function(WeightsFunction::new(|_, _, _| 9));
        let parsed = IndexConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert!(parsed.weights_function.is_none());

        let doc = Document::new();
        let weights = config.weights_function.unwrap();
        assert_eq!(weights.weight("title", "x", &doc), 9);
    }
}
