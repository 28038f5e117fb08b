//! Text analysis module for Falcata.
//!
//! This module provides tokenization, token filters, the per-language
//! resources (stopword sets and stemmers) and the diacritic folding table
//! used by the term generator.

pub mod diacritics;
pub mod resources;
pub mod stemmer;
pub mod stopwords;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
