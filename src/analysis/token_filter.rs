//! Token filter implementations for token transformation.
//!
//! Filters receive a token stream and produce a new one. The term
//! generator runs `Tokenizer → Lowercase → Stop` before emitting terms;
//! the stop filter only marks tokens so the generator can apply the
//! configured stopword strategy to the unstemmed and stemmed forms.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod stop;

pub use lowercase::LowercaseFilter;
pub use stop::StopFilter;
