//! Word n-gram (shingle) filter.
//!
//! Emits every contiguous run of `min_size..=max_size` non-stopped tokens,
//! joined with a single space, so that a vocabulary can contain phrases
//! such as `"not happy"` alongside single words.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{MoodlensError, Result};

/// A filter producing word n-grams.
#[derive(Clone, Debug)]
pub struct ShingleFilter {
    min_size: usize,
    max_size: usize,
}

impl ShingleFilter {
    /// Create a filter emitting n-grams with `min_size <= n <= max_size`.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self> {
        if min_size == 0 || min_size > max_size {
            return Err(MoodlensError::invalid_argument(format!(
                "invalid n-gram range ({min_size}, {max_size})"
            )));
        }
        Ok(Self { min_size, max_size })
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words: Vec<Token> = tokens.filter(|t| !t.is_stopped()).collect();
        let mut output = Vec::new();

        for start in 0..words.len() {
            for size in self.min_size..=self.max_size {
                let end = start + size;
                if end > words.len() {
                    break;
                }
                let window = &words[start..end];
                let text = window
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                output.push(Token::with_offsets(
                    text,
                    output.len(),
                    window[0].start_offset,
                    window[size - 1].end_offset,
                ));
            }
        }

        Ok(Box::new(output.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(filter: &ShingleFilter, words: &[&str]) -> Vec<String> {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_unigrams_and_bigrams() {
        let filter = ShingleFilter::new(1, 2).unwrap();
        assert_eq!(
            texts(&filter, &["not", "very", "happy"]),
            vec!["not", "not very", "very", "very happy", "happy"]
        );
    }

    #[test]
    fn test_bigrams_only() {
        let filter = ShingleFilter::new(2, 2).unwrap();
        assert_eq!(texts(&filter, &["feel", "great"]), vec!["feel great"]);
        assert!(texts(&filter, &["alone"]).is_empty());
    }

    #[test]
    fn test_invalid_range() {
        assert!(ShingleFilter::new(0, 1).is_err());
        assert!(ShingleFilter::new(3, 2).is_err());
    }
}
