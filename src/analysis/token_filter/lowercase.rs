//! Token-level case folding.
//!
//! Vocabulary terms are stored lowercase, so the vectorizer folds every token
//! even when the text it receives skipped normalization.
//!
//! ```
//! use moodlens::analysis::token::Token;
//! use moodlens::analysis::token_filter::{Filter, LowercaseFilter};
//!
//! let tokens = vec![Token::new("HAPPY", 0), Token::new("Days", 1)];
//! let folded: Vec<_> = LowercaseFilter::new()
//!     .filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(folded, vec!["happy", "days"]);
//! ```

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Lowercases token text. Stopped tokens pass through untouched.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    pub fn new() -> Self {
        LowercaseFilter
    }
}

fn fold(mut token: Token) -> Token {
    if !token.is_stopped() && token.text.chars().any(char::is_uppercase) {
        token.text = token.text.to_lowercase();
    }
    token
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(fold)))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tokens: Vec<Token>) -> Vec<Token> {
        LowercaseFilter::new()
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect()
    }

    #[test]
    fn test_folds_mixed_case() {
        let out = run(vec![Token::new("Grateful", 0), Token::new("ÜBER", 1)]);
        assert_eq!(out[0].text, "grateful");
        assert_eq!(out[1].text, "über");
    }

    #[test]
    fn test_stopped_tokens_untouched() {
        let out = run(vec![Token::new("The", 0).stop(), Token::new("Joy", 1)]);
        assert_eq!(out[0].text, "The");
        assert!(out[0].is_stopped());
        assert_eq!(out[1].text, "joy");
    }

    #[test]
    fn test_positions_preserved() {
        let out = run(vec![Token::with_offsets("WOW", 3, 10, 13)]);
        assert_eq!((out[0].position, out[0].start_offset, out[0].end_offset), (3, 10, 13));
    }
}
