//! Unicode word tokenizer implementation.
//!
//! Splits text using Unicode word boundary rules (UAX #29) and keeps only
//! segments that contain an alphanumeric character. Positions count words,
//! not segments, so punctuation and whitespace do not open position gaps.
//!
//! With CJK n-gram mode enabled, every run of adjacent CJK characters is
//! emitted as its single characters followed by its overlapping bigrams.
//!
//! # Examples
//!
//! ```
//! use falcata::analysis::tokenizer::Tokenizer;
//! use falcata::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
//!
//! let tokenizer = UnicodeWordTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello, café world!").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].text, "café");
//! assert_eq!(tokens[2].position, 2);
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that splits text on Unicode word boundaries.
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer {
    cjk_ngrams: bool,
}

impl UnicodeWordTokenizer {
    /// Create a new Unicode word tokenizer.
    pub fn new() -> Self {
        UnicodeWordTokenizer { cjk_ngrams: false }
    }

    /// Enable or disable CJK n-gram generation.
    pub fn with_cjk_ngrams(mut self, enabled: bool) -> Self {
        self.cjk_ngrams = enabled;
        self
    }

    /// Detect token type based on character content.
    fn detect_token_type(word: &str) -> TokenType {
        if word.chars().all(|c| c.is_numeric()) {
            TokenType::Num
        } else if word.chars().any(is_cjk) {
            TokenType::Cjk
        } else if word.chars().any(|c| c.is_alphanumeric()) {
            TokenType::Alphanum
        } else {
            TokenType::Other
        }
    }

    /// Emit unigrams then bigrams for a run of CJK characters.
    fn push_cjk_run(tokens: &mut Vec<Token>, run: &[(usize, char)], position: &mut usize) {
        let base = *position;
        for (i, &(offset, c)) in run.iter().enumerate() {
            tokens.push(
                Token::with_offsets(c.to_string(), base + i, offset, offset + c.len_utf8())
                    .with_token_type(TokenType::Cjk),
            );
        }
        for (i, pair) in run.windows(2).enumerate() {
            let (start, first) = pair[0];
            let (offset, second) = pair[1];
            let text: String = [first, second].iter().collect();
            tokens.push(
                Token::with_offsets(text, base + i, start, offset + second.len_utf8())
                    .with_token_type(TokenType::Cjk),
            );
        }
        *position += run.len();
    }
}

/// Whether `c` belongs to one of the CJK scripts handled by n-gram mode.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |   // CJK Unified Ideographs
        '\u{3400}'..='\u{4DBF}' |   // CJK Extension A
        '\u{20000}'..='\u{2CEAF}' | // CJK Extensions B-E
        '\u{F900}'..='\u{FAFF}' |   // CJK Compatibility Ideographs
        '\u{3040}'..='\u{309F}' |   // Hiragana
        '\u{30A0}'..='\u{30FF}' |   // Katakana
        '\u{AC00}'..='\u{D7AF}'     // Hangul syllables
    )
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0;
        let mut cjk_run: Vec<(usize, char)> = Vec::new();

        for (start_offset, word) in text.split_word_bound_indices() {
            if !word.chars().any(|c| c.is_alphanumeric()) {
                if !cjk_run.is_empty() {
                    Self::push_cjk_run(&mut tokens, &cjk_run, &mut position);
                    cjk_run.clear();
                }
                continue;
            }

            if self.cjk_ngrams && word.chars().all(is_cjk) {
                cjk_run.extend(word.char_indices().map(|(i, c)| (start_offset + i, c)));
                continue;
            }

            if !cjk_run.is_empty() {
                Self::push_cjk_run(&mut tokens, &cjk_run, &mut position);
                cjk_run.clear();
            }

            let token_type = Self::detect_token_type(word);
            tokens.push(
                Token::with_offsets(word, position, start_offset, start_offset + word.len())
                    .with_token_type(token_type),
            );
            position += 1;
        }

        if !cjk_run.is_empty() {
            Self::push_cjk_run(&mut tokens, &cjk_run, &mut position);
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}
