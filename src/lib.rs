//! # Moodlens
//!
//! Emotion labeling for free text, built from two independent signals.
//!
//! ## Features
//!
//! - A weighted ensemble of pre-trained classifiers (linear SVC, logistic
//!   regression, naive Bayes, k-NN, decision tree, random forest, gradient
//!   boosting) producing a label distribution, confidence and agreement
//! - A keyword rule scorer with named, ordered adjustments for intensifiers,
//!   context and motivational phrasing
//! - Longitudinal analytics over stored analysis records
//! - A text normalization pipeline built from char filters and tokenizers
//!
//! ## Example
//!
//! ```
//! use moodlens::prelude::*;
//!
//! let engine = EmotionEngine::builder().build().unwrap();
//! let analysis = engine.analyze_text("I am extremely worried about tomorrow");
//! assert_eq!(analysis.rules.label, EmotionLabel::Fear);
//! ```

pub mod analysis;
pub mod analytics;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod label;
pub mod loader;
pub mod ml;
pub mod rules;
pub mod store;

pub mod prelude {
    pub use crate::analytics::{AnalysisRecord, AnalyticsSummary, Mood, Trend};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{EmotionAnalysis, EmotionEngine};
    pub use crate::error::{MoodlensError, Result};
    pub use crate::label::{EmotionLabel, LabelDistribution};
    pub use crate::loader::{ClassifierLoader, DirectoryLoader, StaticLoader};
    pub use crate::ml::EnsembleResult;
    pub use crate::rules::RuleScores;
    pub use crate::store::{Clock, FixedClock, SystemClock};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
