//! Error types for the Moodlens library.
//!
//! All fallible operations return [`MoodlensError`] through the crate-wide
//! [`Result`] alias. Only configuration problems are surfaced to callers of
//! the analysis entry points; a classifier that fails during inference is
//! recovered locally by the classifier bank.
//!
//! # Examples
//!
//! ```
//! use moodlens::error::{MoodlensError, Result};
//!
//! fn load_weights() -> Result<()> {
//!     Err(MoodlensError::configuration("no vocabulary loaded"))
//! }
//!
//! match load_weights() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Moodlens operations.
#[derive(Error, Debug)]
pub enum MoodlensError {
    /// Vocabulary or classifier set missing or malformed. Fatal, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single classifier failed while predicting.
    #[error("Classifier '{classifier}' failed: {message}")]
    ClassifierInference { classifier: String, message: String },

    /// Text analysis errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid argument supplied by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors (model files, record files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with MoodlensError.
pub type Result<T> = std::result::Result<T, MoodlensError>;

impl MoodlensError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        MoodlensError::Configuration(msg.into())
    }

    /// Create a new inference error for the named classifier.
    pub fn inference<N: Into<String>, S: Into<String>>(classifier: N, msg: S) -> Self {
        MoodlensError::ClassifierInference {
            classifier: classifier.into(),
            message: msg.into(),
        }
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        MoodlensError::Analysis(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        MoodlensError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        MoodlensError::Other(msg.into())
    }

    /// Whether this error means the engine cannot be configured at all.
    pub fn is_configuration(&self) -> bool {
        matches!(self, MoodlensError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = MoodlensError::configuration("vocabulary missing");
        assert_eq!(error.to_string(), "Configuration error: vocabulary missing");
        assert!(error.is_configuration());

        let error = MoodlensError::inference("knn", "dimension mismatch");
        assert_eq!(
            error.to_string(),
            "Classifier 'knn' failed: dimension mismatch"
        );
        assert!(!error.is_configuration());

        let error = MoodlensError::analysis("bad pattern");
        assert_eq!(error.to_string(), "Analysis error: bad pattern");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = MoodlensError::from(io_error);

        match error {
            MoodlensError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
