//! Typed value storage.
//!
//! Field values that are sortable or collapsible are stored next to the
//! document's terms, each under a numeric slot, encoded by a codec chosen
//! from the field's declared type.

pub mod accessor;
pub mod codec;
pub mod slot;
