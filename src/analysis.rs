//! Text analysis for emotion scoring.
//!
//! Raw text first passes through the [`normalizer::TextNormalizer`], a fixed
//! chain of char filters. Normalized text is then either scanned directly by
//! the rule-based adjuster or tokenized by a [`analyzer::PipelineAnalyzer`]
//! for vectorization.

pub mod analyzer;
pub mod char_filter;
pub mod features;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer};
pub use features::TextFeatures;
pub use normalizer::{NormalizerConfig, TextNormalizer};
pub use token::{Token, TokenStream};
