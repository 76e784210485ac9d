//! Analyzers turn normalized text into the term stream a vectorizer counts.
//!
//! ```text
//! Text → Char Filters → Tokenizer → Filter 1 → … → Filter N → Tokens
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// Analyzers are shared across threads by every concurrent analysis call,
/// so implementations must be immutable after construction.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &str;
}

pub mod pipeline;

pub use pipeline::PipelineAnalyzer;
