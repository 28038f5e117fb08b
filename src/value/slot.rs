//! Value slot identifiers.
//!
//! A field's typed value is stored under a numeric slot. The slot of a
//! named field is the CRC-32 of its UTF-8 name, so the same name resolves
//! to the same slot on every write and read, across processes. Callers
//! that already address values numerically can pass a literal slot.
//!
//! A name is always hashed, even when it looks like a number: `"7"` and
//! `7` are different slots. Only [`ValueSlot::Number`] bypasses the hash.
//!
//! # Examples
//!
//! ```
//! use falcata::value::slot::{ValueSlot, slot_for_name};
//!
//! assert_eq!(ValueSlot::from("price").resolve(), slot_for_name("price"));
//! assert_eq!(ValueSlot::from(7u32).resolve(), 7);
//! assert_ne!(ValueSlot::from("7").resolve(), 7);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of a stored value: a field name or a literal slot number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSlot {
    /// Slot derived from the field name.
    Name(String),
    /// Literal slot number.
    Number(u32),
}

impl ValueSlot {
    /// The numeric slot this address refers to.
    pub fn resolve(&self) -> u32 {
        match self {
            ValueSlot::Name(name) => slot_for_name(name),
            ValueSlot::Number(slot) => *slot,
        }
    }

    /// The field name, for name-derived slots.
    pub fn name(&self) -> Option<&str> {
        match self {
            ValueSlot::Name(name) => Some(name),
            ValueSlot::Number(_) => None,
        }
    }
}

/// Deterministic slot of a field name.
pub fn slot_for_name(name: &str) -> u32 {
    crc32fast::hash(name.as_bytes())
}

impl From<&str> for ValueSlot {
    fn from(name: &str) -> Self {
        ValueSlot::Name(name.to_string())
    }
}

impl From<String> for ValueSlot {
    fn from(name: String) -> Self {
        ValueSlot::Name(name)
    }
}

impl From<u32> for ValueSlot {
    fn from(slot: u32) -> Self {
        ValueSlot::Number(slot)
    }
}

impl fmt::Display for ValueSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSlot::Name(name) => write!(f, "{name}#{}", slot_for_name(name)),
            ValueSlot::Number(slot) => write!(f, "#{slot}"),
        }
    }
}
