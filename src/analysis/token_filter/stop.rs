//! Stop filter implementation.
//!
//! Marks tokens whose text is in a [`StopwordSet`]. Whether a marked token
//! is dropped, kept, or kept only in its unstemmed form is decided later by
//! the term generator's [`StopperStrategy`](crate::analysis::resources::StopperStrategy).
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use falcata::analysis::stopwords::StopwordSet;
//! use falcata::analysis::token::Token;
//! use falcata::analysis::token_filter::Filter;
//! use falcata::analysis::token_filter::stop::StopFilter;
//!
//! let filter = StopFilter::new(Arc::new(StopwordSet::from_words("english", ["the"])));
//! let tokens = vec![Token::new("the", 0), Token::new("quick", 1)];
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
//!
//! assert!(result[0].is_stopped());
//! assert!(!result[1].is_stopped());
//! ```

use std::sync::Arc;

use crate::analysis::stopwords::StopwordSet;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that marks stop words in the token stream.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<StopwordSet>,
}

impl StopFilter {
    /// Create a stop filter that marks (but keeps) stop words.
    pub fn new(stop_words: Arc<StopwordSet>) -> Self {
        StopFilter { stop_words }
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stop_words = Arc::clone(&self.stop_words);
        Ok(Box::new(tokens.map(move |token| {
            if token.is_stopped() || !stop_words.contains(&token.text) {
                token
            } else {
                token.stop()
            }
        })))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
