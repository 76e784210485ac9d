//! Char filter implementations for text normalization.
//!
//! Char filters rewrite the raw string before anything is tokenized. The
//! [`TextNormalizer`](crate::analysis::normalizer::TextNormalizer) is a fixed
//! chain of these filters.
//!
//! # Available Filters
//!
//! - [`unicode_normalize::UnicodeNormalizationCharFilter`] - Unicode normalization (NFC, NFKC, etc.)
//! - [`lowercase::LowercaseCharFilter`] - Unicode-aware case folding
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//! - [`mapping::MappingCharFilter`] - Literal string mapping
//!
//! # Examples
//!
//! ```
//! use moodlens::analysis::char_filter::CharFilter;
//! use moodlens::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::new(r"\d+", "#").unwrap();
//! assert_eq!(filter.filter("day 42"), "day #");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the rewritten text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod mapping;
pub mod pattern_replace;
pub mod unicode_normalize;

pub use lowercase::LowercaseCharFilter;
pub use mapping::MappingCharFilter;
pub use pattern_replace::PatternReplaceCharFilter;
pub use unicode_normalize::{NormalizationForm, UnicodeNormalizationCharFilter};
