//! Indexing pipeline: from document fields to index terms.
//!
//! - [`term`] - Generated terms and the per-document [`term::TermSet`]
//! - [`generator`] - The [`generator::TermGenerator`] applying the field policy

pub mod generator;
pub mod term;
