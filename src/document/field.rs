//! Field declarations and the per-field indexing policy.
//!
//! A [`FieldSpec`] names a field, declares the type its values are stored
//! as, and carries the [`FieldFlags`] that decide which terms the field
//! produces:
//!
//! | flag | effect |
//! |---|---|
//! | `unindexed` | no terms at all (values may still be stored) |
//! | `array` | each element of an array value is indexed on its own |
//! | `without_field_name` | only the unprefixed terms are emitted |
//! | `field_name_only` | only the `X<FIELD>`-prefixed terms are emitted |
//! | `exact` | one extra term: prefix + whole lowercased value |
//! | `boolean` | only a zero-weight prefix + lowercased value term |
//!
//! # Examples
//!
//! ```
//! use falcata::document::field::{FieldSpec, FieldType};
//!
//! let spec = FieldSpec::new("status", FieldType::Text).boolean();
//! assert!(spec.flags.boolean);
//! assert_eq!(spec.prefix(), "XSTATUS");
//! ```

use serde::{Deserialize, Serialize};

/// Declared type of a field's values.
///
/// The value codec is chosen by this type when a field value is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text (the default).
    #[default]
    Text,
    /// Signed integer.
    Integer,
    /// Double-precision float.
    Float,
    /// true/false.
    Boolean,
    /// UTC timestamp.
    DateTime,
    /// Calendar date without time.
    Date,
    /// Raw bytes.
    Binary,
}

impl FieldType {
    /// Lowercase name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "datetime",
            FieldType::Date => "date",
            FieldType::Binary => "binary",
        }
    }
}

/// Classification flags controlling term emission for a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldFlags {
    /// Index each element of an array value independently.
    pub array: bool,

    /// Emit an exact-match term for the whole lowercased value.
    pub exact: bool,

    /// Emit only a zero-weight filtering term for the value.
    pub boolean: bool,

    /// Do not emit prefixed terms.
    pub without_field_name: bool,

    /// Do not emit unprefixed terms.
    pub field_name_only: bool,

    /// Exclude the field from term generation.
    pub unindexed: bool,
}

impl FieldFlags {
    /// Whether unprefixed terms are emitted.
    pub fn emits_unprefixed(&self) -> bool {
        !self.field_name_only
    }

    /// Whether `X<FIELD>`-prefixed terms are emitted.
    pub fn emits_prefixed(&self) -> bool {
        !self.without_field_name
    }
}

/// Declaration of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as used in documents.
    pub name: String,

    /// Declared value type.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Term emission flags.
    #[serde(default)]
    pub flags: FieldFlags,
}

impl FieldSpec {
    /// Declare a field with default flags.
    pub fn new<S: Into<String>>(name: S, field_type: FieldType) -> Self {
        FieldSpec {
            name: name.into(),
            field_type,
            flags: FieldFlags::default(),
        }
    }

    /// The term prefix for this field.
    pub fn prefix(&self) -> String {
        field_prefix(&self.name)
    }

    pub fn array(mut self) -> Self {
        self.flags.array = true;
        self
    }

    pub fn exact(mut self) -> Self {
        self.flags.exact = true;
        self
    }

    pub fn boolean(mut self) -> Self {
        self.flags.boolean = true;
        self
    }

    pub fn without_field_name(mut self) -> Self {
        self.flags.without_field_name = true;
        self
    }

    pub fn field_name_only(mut self) -> Self {
        self.flags.field_name_only = true;
        self
    }

    pub fn unindexed(mut self) -> Self {
        self.flags.unindexed = true;
        self
    }
}

/// The term prefix of a field: `X` followed by the uppercased field name.
pub fn field_prefix(name: &str) -> String {
    format!("X{}", name.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_prefix() {
        assert_eq!(field_prefix("name"), "XNAME");
        assert_eq!(field_prefix("first_name"), "XFIRST_NAME");
    }

    #[test]
    fn test_flags_builder() {
        let spec = FieldSpec::new("tags", FieldType::Text)
            .array()
            .exact()
            .field_name_only();

        assert!(spec.flags.array);
        assert!(spec.flags.exact);
        assert!(!spec.flags.emits_unprefixed());
        assert!(spec.flags.emits_prefixed());
        assert!(!spec.flags.unindexed);
    }

    #[test]
    fn test_spec_serde() {
        let spec: FieldSpec =
            serde_json::from_str(r#"{"name": "born", "type": "datetime", "flags": {"unindexed": true}}"#)
                .unwrap();
        assert_eq!(spec.field_type, FieldType::DateTime);
        assert!(spec.flags.unindexed);
        assert!(!spec.flags.exact);

        let spec: FieldSpec = serde_json::from_str(r#"{"name": "body"}"#).unwrap();
        assert_eq!(spec.field_type, FieldType::Text);
        assert_eq!(spec.flags, FieldFlags::default());
    }
}
