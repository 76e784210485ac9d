//! Surface statistics of a raw text.
//!
//! These are cheap descriptive features reported next to every analysis.
//! They are computed on the original text, before normalization, since
//! punctuation and casing are exactly what normalization removes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Descriptive statistics for one text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    pub char_count: usize,
    pub word_count: usize,
    /// Non-empty segments delimited by `.`, `!` or `?`.
    pub sentence_count: usize,
    /// Mean number of characters per whitespace-delimited word.
    pub avg_word_length: f64,
    /// Distinct lowercase words over total words.
    pub lexical_diversity: f64,
    /// Punctuation characters over total characters.
    pub punctuation_ratio: f64,
    pub exclamation_count: usize,
    pub question_count: usize,
    pub uppercase_count: usize,
    pub digit_count: usize,
}

impl TextFeatures {
    /// Compute the statistics of `text`. Empty input gives all zeros.
    pub fn extract(text: &str) -> Self {
        let char_count = text.chars().count();
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len();

        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|segment| !segment.trim().is_empty())
            .count();

        let word_chars: usize = words.iter().map(|w| w.chars().count()).sum();
        let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();

        let mut punctuation = 0;
        let mut exclamation_count = 0;
        let mut question_count = 0;
        let mut uppercase_count = 0;
        let mut digit_count = 0;
        for c in text.chars() {
            match c {
                '!' => exclamation_count += 1,
                '?' => question_count += 1,
                _ => {}
            }
            if c.is_uppercase() {
                uppercase_count += 1;
            }
            if c.is_numeric() {
                digit_count += 1;
            }
            if !c.is_alphanumeric() && !c.is_whitespace() && c != '_' {
                punctuation += 1;
            }
        }

        Self {
            char_count,
            word_count,
            sentence_count,
            avg_word_length: ratio(word_chars, word_count),
            lexical_diversity: ratio(unique.len(), word_count),
            punctuation_ratio: ratio(punctuation, char_count),
            exclamation_count,
            question_count,
            uppercase_count,
            digit_count,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
