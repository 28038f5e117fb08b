//! # Falcata
//!
//! Document term generation and typed value storage for full-text indexes.
//!
//! ## Features
//!
//! - Per-field indexing policy (prefixed, exact, boolean, unindexed and array fields)
//! - Snowball stemming with configurable stop word strategies
//! - ASCII-folded duplicates of accented terms
//! - Typed value slots for sorting and collapsing
//! - All-or-nothing transactions over a pluggable index engine

pub mod analysis;
pub mod document;
pub mod error;
pub mod index;
pub mod indexing;
pub mod value;

pub mod prelude {
    pub use crate::analysis::resources::{StemmerChoice, StopperChoice, StopperStrategy};
    pub use crate::document::document::{DocId, Document, SearchHit};
    pub use crate::document::field::{FieldFlags, FieldSpec, FieldType};
    pub use crate::document::field_value::FieldValue;
    pub use crate::error::{FalcataError, Result};
    pub use crate::index::config::{IndexConfig, WeightsFunction};
    pub use crate::index::index::Index;
    pub use crate::indexing::term::{GeneratedTerm, TermSet};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
