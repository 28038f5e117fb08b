//! Field value types for documents.
//!
//! This module defines the [`FieldValue`] enum which represents every kind
//! of value a document field can hold, together with the two string forms
//! the indexer needs:
//!
//! - the *index string* ([`FieldValue::index_string`]) that is tokenized
//!   into terms. Timestamps become `YYYYMMDDHHMMSS` (UTC), dates become
//!   `YYYYMMDD` and arrays are their elements joined by a space.
//! - the *generic string* (`Display`) used when a value is stored without a
//!   type-specific codec.
//!
//! # Examples
//!
//! ```
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use falcata::document::field_value::FieldValue;
//!
//! let ts = FieldValue::DateTime(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 30).unwrap());
//! assert_eq!(ts.index_string().unwrap(), "20240309140530");
//!
//! let date = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
//! assert_eq!(date.index_string().unwrap(), "20240309");
//!
//! let tags = FieldValue::from(vec!["rust", "search"]);
//! assert_eq!(tags.index_string().unwrap(), "rust search");
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::field::FieldType;
use crate::error::{FalcataError, Result};

/// Format of a timestamp's index string.
pub const DATETIME_INDEX_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format of a date's index string and stored value.
pub const DATE_INDEX_FORMAT: &str = "%Y%m%d";

/// Represents a value for a field in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Binary data
    Binary(Vec<u8>),
    /// DateTime value
    DateTime(DateTime<Utc>),
    /// Calendar date without a time of day
    Date(NaiveDate),
    /// A sequence of values
    Array(Vec<FieldValue>),
    /// Null value
    Null,
}

impl FieldValue {
    /// Get the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Convert to boolean.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            FieldValue::Text(s) => match s.to_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" | "on" => Some(true),
                "false" | "f" | "no" | "n" | "0" | "off" => Some(false),
                _ => None,
            },
            FieldValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Get the timestamp if this is a datetime value.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Get the date if this is a date value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the value as binary data, if possible.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// Get the elements if this is an array value.
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Check if this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The scalar type of this value.
    ///
    /// Arrays report the type of their first non-null element; null and
    /// empty arrays have no type.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            FieldValue::Text(_) => Some(FieldType::Text),
            FieldValue::Integer(_) => Some(FieldType::Integer),
            FieldValue::Float(_) => Some(FieldType::Float),
            FieldValue::Boolean(_) => Some(FieldType::Boolean),
            FieldValue::Binary(_) => Some(FieldType::Binary),
            FieldValue::DateTime(_) => Some(FieldType::DateTime),
            FieldValue::Date(_) => Some(FieldType::Date),
            FieldValue::Array(values) => values.iter().find_map(FieldValue::field_type),
            FieldValue::Null => None,
        }
    }

    /// The string that is tokenized when this value is indexed.
    ///
    /// Fails with [`FalcataError::ValueType`] for binary data that is not
    /// valid UTF-8.
    pub fn index_string(&self) -> Result<String> {
        match self {
            FieldValue::Text(s) => Ok(s.clone()),
            FieldValue::DateTime(dt) => Ok(dt.format(DATETIME_INDEX_FORMAT).to_string()),
            FieldValue::Date(d) => Ok(d.format(DATE_INDEX_FORMAT).to_string()),
            FieldValue::Array(values) => {
                let parts = values
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(FieldValue::index_string)
                    .collect::<Result<Vec<_>>>()?;
                Ok(parts.join(" "))
            }
            FieldValue::Binary(data) => String::from_utf8(data.clone()).map_err(|_| {
                FalcataError::value_type(format!(
                    "binary value of {} bytes has no string form",
                    data.len()
                ))
            }),
            FieldValue::Null => Ok(String::new()),
            other => Ok(other.to_string()),
        }
    }

    /// Split this value into the values indexed independently for an
    /// array field. Non-array values yield themselves.
    pub fn elements(&self) -> Vec<&FieldValue> {
        match self {
            FieldValue::Array(values) => values.iter().collect(),
            other => vec![other],
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Binary(data) => f.write_str(&String::from_utf8_lossy(data)),
            FieldValue::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Array(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map_or(FieldValue::Null, FieldValue::Float),
            },
            Value::String(s) => FieldValue::Text(s),
            Value::Array(values) => {
                FieldValue::Array(values.into_iter().map(FieldValue::from).collect())
            }
            object @ Value::Object(_) => FieldValue::Text(object.to_string()),
        }
    }
}
