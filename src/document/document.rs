//! Document structure.
//!
//! A [`Document`] is an ordered collection of named field values plus an
//! opaque payload blob. A document is created either from authored field
//! data (no identifier yet) or from an index lookup or search hit
//! (identifier present, and a relevance weight for hits). Once the index
//! has assigned an identifier it never changes.
//!
//! Documents that are bound to an [`Index`] can regenerate their terms and
//! stored values from the index's policy, save themselves and read their
//! stored terms back. Unbound documents report
//! [`FalcataError::ResourceNotConfigured`] for those operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::resources::{StemmerChoice, StopperChoice, StopperStrategy};
use crate::document::field_value::FieldValue;
use crate::error::{FalcataError, Result};
use crate::index::index::Index;
use crate::indexing::term::{GeneratedTerm, TermSet};
use crate::value::accessor::ValueSet;

/// Identifier the index engine assigns to a stored document.
pub type DocId = u32;

/// Name of the field plain-text documents are stored under.
pub const CONTENT_FIELD: &str = "content";

/// Name of the field map entry taken as the document identifier.
pub const ID_FIELD: &str = "id";

/// A search result reference: which document matched and how well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocId,
    pub weight: f64,
}

/// Per-document overrides of the index's language resources.
///
/// Unset entries fall back to the index configuration. A `language` sets
/// both the stemmer and the stopper unless those are given explicitly.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    pub language: Option<String>,
    pub stemmer: Option<StemmerChoice>,
    pub stopper: Option<StopperChoice>,
    pub stopper_strategy: Option<StopperStrategy>,
}

/// A document represents a single item to be indexed.
#[derive(Clone, Default)]
pub struct Document {
    id: Option<DocId>,
    fields: Vec<(String, FieldValue)>,
    data: Vec<u8>,
    weight: Option<f64>,
    options: DocumentOptions,
    terms: TermSet,
    values: ValueSet,
    index: Option<Index>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Create a document holding `text` in the `content` field.
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        let mut doc = Document::new();
        doc.add_field(CONTENT_FIELD, FieldValue::Text(text.into()));
        doc
    }

    /// Create a document from name/value pairs.
    ///
    /// An `id` entry holding a positive integer becomes the document
    /// identifier (it is also kept as an ordinary field).
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut doc = Document::new();
        for (name, value) in fields {
            doc.add_field(name, value.into());
        }
        doc.id = doc
            .get_field(ID_FIELD)
            .and_then(FieldValue::as_integer)
            .and_then(|id| DocId::try_from(id).ok())
            .filter(|id| *id > 0);
        doc
    }

    /// Create a document from JSON.
    ///
    /// Objects become field maps; any other JSON value is stored as text
    /// in the `content` field.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(match value {
            serde_json::Value::Object(map) => Document::from_fields(map),
            serde_json::Value::String(text) => Document::from_text(text),
            other => Document::from_text(other.to_string()),
        })
    }

    /// The identifier, absent until the document is first saved.
    pub fn id(&self) -> Option<DocId> {
        self.id
    }

    /// Relevance weight when this document came from a search hit.
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// The opaque payload blob. Empty when none was set.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the payload blob.
    pub fn set_data<D: Into<Vec<u8>>>(&mut self, data: D) {
        self.data = data.into();
    }

    /// Add a field value, replacing an existing value of the same name in place.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field value from the document.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Remove a field from the document.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Get all field names in insertion order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterate over the fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut DocumentOptions {
        &mut self.options
    }

    /// The index this document is bound to, if any.
    pub fn index(&self) -> Option<&Index> {
        self.index.as_ref()
    }

    /// Bind this document to an index.
    pub fn bind(&mut self, index: &Index) {
        self.index = Some(index.clone());
    }

    /// Terms generated by the last [`regenerate`](Self::regenerate).
    pub fn generated_terms(&self) -> &TermSet {
        &self.terms
    }

    /// Encoded values generated by the last regeneration, or read from the index.
    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    /// Clear and rebuild the stored values and the terms of this document
    /// from the bound index's policy.
    ///
    /// Repeating this without changing the fields produces the same result.
    pub fn regenerate(&mut self) -> Result<()> {
        let index = self.require_index("regenerate")?.clone();
        index.regenerate(self)
    }

    /// Save the document to its bound index: insert when it has no
    /// identifier, replace at its identifier otherwise.
    pub fn save(&mut self) -> Result<DocId> {
        let index = self.require_index("save")?.clone();
        index.save(self)
    }

    /// The terms stored in the index for this document.
    pub fn terms(&self) -> Result<Vec<GeneratedTerm>> {
        let index = self.require_index("terms")?;
        let id = self
            .id
            .ok_or_else(|| FalcataError::not_found("document has not been saved"))?;
        index.stored_terms(id)
    }

    /// Decode the stored value of `field` using the bound index's codecs.
    ///
    /// A field without a stored value yields an empty value.
    pub fn value(&self, field: &str) -> Result<FieldValue> {
        let index = self.require_index("value")?;
        index.fetch_value(&self.values, field)
    }

    fn require_index(&self, operation: &str) -> Result<&Index> {
        self.index.as_ref().ok_or_else(|| {
            FalcataError::resource_not_configured(format!(
                "document {operation} requires a bound index"
            ))
        })
    }

    pub(crate) fn assign_id(&mut self, id: DocId) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }

    pub(crate) fn set_weight(&mut self, weight: f64) {
        self.weight = Some(weight);
    }

    pub(crate) fn set_generated(&mut self, terms: TermSet, values: ValueSet) {
        self.terms = terms;
        self.values = values;
    }

    pub(crate) fn from_stored(
        index: &Index,
        id: DocId,
        fields: Vec<(String, FieldValue)>,
        data: Vec<u8>,
        values: ValueSet,
    ) -> Self {
        Document {
            id: Some(id),
            fields,
            data,
            values,
            index: Some(index.clone()),
            ..Document::default()
        }
    }
}

impl PartialEq for Document {
    /// Equal when both have the same identifier and belong to the same index.
    fn eq(&self, other: &Self) -> bool {
        self.id.is_some()
            && self.id == other.id
            && self.index.as_ref().map(Index::uuid) == other.index.as_ref().map(Index::uuid)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .field("fields", &self.fields)
            .field("data_len", &self.data.len())
            .field("index", &self.index.as_ref().map(Index::uuid))
            .finish()
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Document::from_text(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Document::from_text(text)
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier to replace at when saved.
    pub fn id(mut self, id: DocId) -> Self {
        self.document.id = Some(id);
        self
    }

    /// Add a text field to the document.
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document
            .add_field(name, FieldValue::Text(value.into()));
        self
    }

    /// Add an integer field to the document.
    pub fn add_integer<S: Into<String>>(mut self, name: S, value: i64) -> Self {
        self.document.add_field(name, FieldValue::Integer(value));
        self
    }

    /// Add a float field to the document.
    pub fn add_float<S: Into<String>>(mut self, name: S, value: f64) -> Self {
        self.document.add_field(name, FieldValue::Float(value));
        self
    }

    /// Add a boolean field to the document.
    pub fn add_boolean<S: Into<String>>(mut self, name: S, value: bool) -> Self {
        self.document.add_field(name, FieldValue::Boolean(value));
        self
    }

    /// Add a datetime field to the document.
    pub fn add_datetime<S: Into<String>>(
        mut self,
        name: S,
        value: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        self.document.add_field(name, FieldValue::DateTime(value));
        self
    }

    /// Add a date field to the document.
    pub fn add_date<S: Into<String>>(mut self, name: S, value: chrono::NaiveDate) -> Self {
        self.document.add_field(name, FieldValue::Date(value));
        self
    }

    /// Add an array field to the document.
    pub fn add_array<S, I, V>(mut self, name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.document.add_field(name, FieldValue::Array(values));
        self
    }

    /// Add a field with a generic value.
    pub fn add_field<S: Into<String>>(mut self, name: S, value: FieldValue) -> Self {
        self.document.add_field(name, value);
        self
    }

    /// Set the opaque payload blob.
    pub fn data<D: Into<Vec<u8>>>(mut self, data: D) -> Self {
        self.document.data = data.into();
        self
    }

    /// Set the language used for both stemming and stop words.
    pub fn language<S: Into<String>>(mut self, language: S) -> Self {
        self.document.options.language = Some(language.into());
        self
    }

    pub fn stemmer<C: Into<StemmerChoice>>(mut self, stemmer: C) -> Self {
        self.document.options.stemmer = Some(stemmer.into());
        self
    }

    pub fn stopper<C: Into<StopperChoice>>(mut self, stopper: C) -> Self {
        self.document.options.stopper = Some(stopper.into());
        self
    }

    pub fn stopper_strategy(mut self, strategy: StopperStrategy) -> Self {
        self.document.options.stopper_strategy = Some(strategy);
        self
    }

    /// Build the final document.
    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_field_order() {
        let doc = Document::builder()
            .add_text("title", "Rust")
            .add_integer("year", 2024)
            .add_array("tags", ["a", "b"])
            .data(b"payload".to_vec())
            .build();

        assert_eq!(doc.field_names(), vec!["title", "year", "tags"]);
        assert_eq!(doc.data(), b"payload");
        assert_eq!(doc.id(), None);
        assert_eq!(doc.weight(), None);
    }

    #[test]
    fn test_add_field_replaces_in_place() {
        let mut doc = Document::builder()
            .add_text("a", "1")
            .add_text("b", "2")
            .build();
        doc.add_field("a", FieldValue::from("3"));

        assert_eq!(doc.field_names(), vec!["a", "b"]);
        assert_eq!(doc.get_field("a"), Some(&FieldValue::from("3")));
        assert_eq!(doc.remove_field("a"), Some(FieldValue::from("3")));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_from_fields_takes_id() {
        let doc = Document::from_fields([
            ("id", FieldValue::Integer(7)),
            ("name", FieldValue::from("john")),
        ]);
        assert_eq!(doc.id(), Some(7));
        assert!(doc.has_field("id"));

        let doc = Document::from_fields([("id", FieldValue::from("seven"))]);
        assert_eq!(doc.id(), None);
    }

    #[test]
    fn test_from_text_and_json() {
        let doc = Document::from("hello world");
        assert_eq!(doc.get_field(CONTENT_FIELD), Some(&FieldValue::from("hello world")));

        let doc = Document::from_json(r#"{"id": 3, "name": "john", "age": 30}"#).unwrap();
        assert_eq!(doc.id(), Some(3));
        assert_eq!(doc.get_field("age"), Some(&FieldValue::Integer(30)));

        let doc = Document::from_json(r#""just text""#).unwrap();
        assert_eq!(doc.get_field(CONTENT_FIELD), Some(&FieldValue::from("just text")));
    }

    #[test]
    fn test_unbound_operations_fail() {
        let mut doc = Document::from("text");
        assert!(matches!(
            doc.terms().unwrap_err(),
            FalcataError::ResourceNotConfigured(_)
        ));
        assert!(matches!(
            doc.save().unwrap_err(),
            FalcataError::ResourceNotConfigured(_)
        ));
        assert!(matches!(
            doc.value("content").unwrap_err(),
            FalcataError::ResourceNotConfigured(_)
        ));
    }

    #[test]
    fn test_unsaved_documents_are_not_equal() {
        let a = Document::from("x");
        let b = Document::from("x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_options() {
        let doc = Document::builder()
            .language("french")
            .stopper(false)
            .stopper_strategy(StopperStrategy::All)
            .build();
        assert_eq!(doc.options().language.as_deref(), Some("french"));
        assert!(matches!(doc.options().stopper, Some(StopperChoice::Disabled)));
        assert_eq!(doc.options().stopper_strategy, Some(StopperStrategy::All));
    }
}
