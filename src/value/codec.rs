//! Binary codecs for stored field values.
//!
//! Each supported value type has one [`ValueCodec`], registered in a
//! [`CodecRegistry`] under its [`FieldType`]. The registry picks the codec
//! by the field's declared type. Layouts:
//!
//! | type | layout |
//! |---|---|
//! | integer in `i32` range | 4 bytes, native byte order, two's complement |
//! | larger integer, float | 8 bytes, big-endian IEEE-754 double |
//! | datetime | 8 bytes, big-endian double of UTC seconds since the epoch |
//! | date | `YYYYMMDD` as ASCII bytes |
//! | boolean, text, undeclared | generic string form as UTF-8 bytes |
//! | binary | raw bytes |
//!
//! Null values encode to no bytes. An absent or empty value decodes to
//! [`FieldValue::Null`] for typed codecs and to empty text otherwise.
//!
//! # Examples
//!
//! ```
//! use falcata::document::field::FieldType;
//! use falcata::document::field_value::FieldValue;
//! use falcata::value::codec::CodecRegistry;
//!
//! let codecs = CodecRegistry::new();
//! let bytes = codecs.encode(&FieldValue::Float(2.5), Some(FieldType::Float)).unwrap();
//! assert_eq!(bytes, 2.5f64.to_be_bytes());
//!
//! let value = codecs.decode(Some(bytes.as_slice()), Some(FieldType::Float)).unwrap();
//! assert_eq!(value, FieldValue::Float(2.5));
//! ```

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use byteorder::{BigEndian, ByteOrder, NativeEndian};
use chrono::{DateTime, NaiveDate, Utc};

use crate::document::field::FieldType;
use crate::document::field_value::{DATE_INDEX_FORMAT, FieldValue};
use crate::error::{FalcataError, Result};
use crate::value::accessor::{StoredValue, ValueSet};
use crate::value::slot::ValueSlot;

/// Serialization of one value type to and from its stored bytes.
pub trait ValueCodec: Send + Sync + fmt::Debug {
    /// The declared type this codec is registered under.
    fn field_type(&self) -> FieldType;

    /// Whether `value` can be encoded by this codec.
    fn accepts(&self, value: &FieldValue) -> bool;

    /// Encode a non-null value.
    fn encode(&self, value: &FieldValue) -> Result<Vec<u8>>;

    /// Decode non-empty bytes written by [`encode`](Self::encode).
    fn decode(&self, bytes: &[u8]) -> Result<FieldValue>;

    /// The value an absent or empty slot decodes to.
    fn empty(&self) -> FieldValue {
        FieldValue::Null
    }

    /// Get the name of this codec (for debugging).
    fn name(&self) -> &'static str;
}

fn mismatch(codec: &dyn ValueCodec, value: &FieldValue) -> FalcataError {
    FalcataError::value_type(format!(
        "{} codec cannot encode {value:?}",
        codec.field_type().as_str()
    ))
}

fn bad_length(codec: &dyn ValueCodec, len: usize) -> FalcataError {
    FalcataError::value_type(format!(
        "{} codec cannot decode {len} bytes",
        codec.field_type().as_str()
    ))
}

fn encode_f64(value: f64) -> Vec<u8> {
    let mut buf = vec![0u8; 8];
    BigEndian::write_f64(&mut buf, value);
    buf
}

/// Integers: 4 native-order bytes, or a big-endian double when out of `i32` range.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCodec;

impl ValueCodec for IntegerCodec {
    fn field_type(&self) -> FieldType {
        FieldType::Integer
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Integer(_))
    }

    fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        let FieldValue::Integer(i) = value else {
            return Err(mismatch(self, value));
        };
        match i32::try_from(*i) {
            Ok(small) => {
                let mut buf = vec![0u8; 4];
                NativeEndian::write_i32(&mut buf, small);
                Ok(buf)
            }
            Err(_) => Ok(encode_f64(*i as f64)),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<FieldValue> {
        match bytes.len() {
            4 => Ok(FieldValue::Integer(NativeEndian::read_i32(bytes).into())),
            8 => Ok(FieldValue::Integer(BigEndian::read_f64(bytes) as i64)),
            len => Err(bad_length(self, len)),
        }
    }

    fn name(&self) -> &'static str {
        "integer"
    }
}

/// Floats: 8 bytes, big-endian double. Integers are widened.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCodec;

impl ValueCodec for FloatCodec {
    fn field_type(&self) -> FieldType {
        FieldType::Float
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Float(_) | FieldValue::Integer(_))
    }

    fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        match value {
            FieldValue::Float(f) => Ok(encode_f64(*f)),
            FieldValue::Integer(i) => Ok(encode_f64(*i as f64)),
            other => Err(mismatch(self, other)),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<FieldValue> {
        match bytes.len() {
            8 => Ok(FieldValue::Float(BigEndian::read_f64(bytes))),
            len => Err(bad_length(self, len)),
        }
    }

    fn name(&self) -> &'static str {
        "float"
    }
}

/// Timestamps: big-endian double of UTC seconds, microsecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeCodec;

impl DateTimeCodec {
    /// The timestamp as stored: truncated to whole microseconds.
    pub fn truncate(value: &DateTime<Utc>) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(value.timestamp_micros()).unwrap_or(*value)
    }
}

impl ValueCodec for DateTimeCodec {
    fn field_type(&self) -> FieldType {
        FieldType::DateTime
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::DateTime(_))
    }

    fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        let FieldValue::DateTime(dt) = value else {
            return Err(mismatch(self, value));
        };
        let seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1e6;
        Ok(encode_f64(seconds))
    }

    fn decode(&self, bytes: &[u8]) -> Result<FieldValue> {
        if bytes.len() != 8 {
            return Err(bad_length(self, bytes.len()));
        }
        let seconds = BigEndian::read_f64(bytes);
        let micros = (seconds * 1e6).round() as i64;
        DateTime::from_timestamp_micros(micros)
            .map(FieldValue::DateTime)
            .ok_or_else(|| FalcataError::value_type(format!("timestamp {seconds} out of range")))
    }

    fn name(&self) -> &'static str {
        "datetime"
    }
}

/// Dates: `YYYYMMDD`. Timestamps are reduced to their UTC date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateCodec;

impl ValueCodec for DateCodec {
    fn field_type(&self) -> FieldType {
        FieldType::Date
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Date(_) | FieldValue::DateTime(_))
    }

    fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        let date = match value {
            FieldValue::Date(d) => *d,
            FieldValue::DateTime(dt) => dt.date_naive(),
            other => return Err(mismatch(self, other)),
        };
        Ok(date.format(DATE_INDEX_FORMAT).to_string().into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<FieldValue> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| FalcataError::value_type("stored date is not UTF-8"))?;
        NaiveDate::parse_from_str(text, DATE_INDEX_FORMAT)
            .map(FieldValue::Date)
            .map_err(|e| FalcataError::value_type(format!("invalid stored date {text:?}: {e}")))
    }

    fn name(&self) -> &'static str {
        "date"
    }
}

/// Booleans: `true` / `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCodec;

impl ValueCodec for BooleanCodec {
    fn field_type(&self) -> FieldType {
        FieldType::Boolean
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Boolean(_))
    }

    fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        match value {
            FieldValue::Boolean(b) => Ok(b.to_string().into_bytes()),
            other => Err(mismatch(self, other)),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<FieldValue> {
        match bytes {
            b"true" => Ok(FieldValue::Boolean(true)),
            b"false" => Ok(FieldValue::Boolean(false)),
            _ => Err(FalcataError::value_type("stored boolean is not true/false")),
        }
    }

    fn name(&self) -> &'static str {
        "boolean"
    }
}

/// Raw bytes, stored unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl ValueCodec for BinaryCodec {
    fn field_type(&self) -> FieldType {
        FieldType::Binary
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Binary(_))
    }

    fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        match value {
            FieldValue::Binary(data) => Ok(data.clone()),
            other => Err(mismatch(self, other)),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<FieldValue> {
        Ok(FieldValue::Binary(bytes.to_vec()))
    }

    fn name(&self) -> &'static str {
        "binary"
    }
}

/// Generic string form. Also used for fields without a declared type.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl ValueCodec for TextCodec {
    fn field_type(&self) -> FieldType {
        FieldType::Text
    }

    fn accepts(&self, _value: &FieldValue) -> bool {
        true
    }

    fn encode(&self, value: &FieldValue) -> Result<Vec<u8>> {
        match value {
            FieldValue::Binary(data) => Ok(data.clone()),
            other => Ok(other.to_string().into_bytes()),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<FieldValue> {
        Ok(match String::from_utf8(bytes.to_vec()) {
            Ok(text) => FieldValue::Text(text),
            Err(e) => FieldValue::Binary(e.into_bytes()),
        })
    }

    fn empty(&self) -> FieldValue {
        FieldValue::Text(String::new())
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

/// Table of value codecs keyed by declared field type.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: AHashMap<FieldType, Arc<dyn ValueCodec>>,
    generic: Arc<dyn ValueCodec>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// A registry holding the built-in codecs.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(IntegerCodec));
        registry.register(Arc::new(FloatCodec));
        registry.register(Arc::new(DateTimeCodec));
        registry.register(Arc::new(DateCodec));
        registry.register(Arc::new(BooleanCodec));
        registry.register(Arc::new(BinaryCodec));
        registry.register(Arc::new(TextCodec));
        registry
    }

    /// A registry without type-specific codecs; everything is stored in
    /// its generic string form.
    pub fn empty() -> Self {
        CodecRegistry {
            codecs: AHashMap::new(),
            generic: Arc::new(TextCodec),
        }
    }

    /// Register a codec under its field type, returning the one it replaces.
    pub fn register(&mut self, codec: Arc<dyn ValueCodec>) -> Option<Arc<dyn ValueCodec>> {
        self.codecs.insert(codec.field_type(), codec)
    }

    /// The codec registered for a type.
    pub fn codec(&self, field_type: FieldType) -> Option<&Arc<dyn ValueCodec>> {
        self.codecs.get(&field_type)
    }

    fn codec_for(&self, declared: Option<FieldType>) -> &Arc<dyn ValueCodec> {
        declared
            .and_then(|t| self.codecs.get(&t))
            .unwrap_or(&self.generic)
    }

    /// Encode `value` for a field of the `declared` type.
    ///
    /// A value the declared type's codec does not accept is stored in its
    /// generic string form. Only a value without one (binary data that is
    /// not UTF-8) is a [`FalcataError::ValueType`].
    pub fn encode(&self, value: &FieldValue, declared: Option<FieldType>) -> Result<Vec<u8>> {
        if value.is_null() {
            return Ok(Vec::new());
        }
        let codec = self.codec_for(declared);
        if codec.accepts(value) {
            return codec.encode(value);
        }
        if matches!(value, FieldValue::Binary(bytes) if std::str::from_utf8(bytes).is_err()) {
            return Err(mismatch(codec.as_ref(), value));
        }
        log::trace!(
            "{} codec does not accept {value:?}, storing its string form",
            codec.name()
        );
        self.generic.encode(value)
    }

    /// Decode stored bytes of a field of the `declared` type.
    ///
    /// `None` (an absent slot) and empty bytes decode to the codec's empty
    /// value. Bytes the declared codec cannot read, such as a string stored
    /// for a mismatched value, decode in their generic string form.
    pub fn decode(&self, bytes: Option<&[u8]>, declared: Option<FieldType>) -> Result<FieldValue> {
        let codec = self.codec_for(declared);
        match bytes {
            None | Some([]) => Ok(codec.empty()),
            Some(bytes) => match codec.decode(bytes) {
                Err(FalcataError::ValueType(msg)) => {
                    log::trace!("{msg}, decoding as a string");
                    self.generic.decode(bytes)
                }
                decoded => decoded,
            },
        }
    }

    /// Encode `value` into a [`StoredValue`] for `slot`.
    pub fn store(
        &self,
        slot: &ValueSlot,
        value: &FieldValue,
        declared: Option<FieldType>,
    ) -> Result<StoredValue> {
        Ok(StoredValue {
            slot: slot.resolve(),
            bytes: self.encode(value, declared)?,
            field_type: declared,
        })
    }

    /// Decode the value stored under `slot` in `values`.
    pub fn fetch(
        &self,
        values: &ValueSet,
        slot: &ValueSlot,
        declared: Option<FieldType>,
    ) -> Result<FieldValue> {
        self.decode(values.get(slot.resolve()), declared)
    }
}
