//! Text normalization applied before any scoring.
//!
//! [`TextNormalizer`] is a fixed chain of char filters:
//!
//! ```text
//! NFKC → lowercase → apostrophes → URLs → emails → noise → contractions → whitespace
//! ```
//!
//! Both the ensemble and the rule-based adjuster consume its output, so the
//! two signals always see identical text.
//!
//! # Examples
//!
//! ```
//! use moodlens::analysis::normalizer::TextNormalizer;
//!
//! let normalizer = TextNormalizer::default();
//! assert_eq!(
//!     normalizer.normalize("I CAN'T believe it!! See https://example.com"),
//!     "i ca not believe it see"
//! );
//! assert_eq!(normalizer.normalize("   "), "");
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::char_filter::{
    CharFilter, LowercaseCharFilter, MappingCharFilter, NormalizationForm,
    PatternReplaceCharFilter, UnicodeNormalizationCharFilter,
};
use crate::error::Result;

const URL_PATTERN: &str = r"(?:https?://|www\.)\S+";
const EMAIL_PATTERN: &str = r"\S+@\S+";
const NOISE_PATTERN: &str = r"[^\p{L}\p{N}\s']";
const WHITESPACE_PATTERN: &str = r"\s+";

/// Typographic apostrophes folded to `'` before contractions are expanded.
const APOSTROPHES: &[(&str, &str)] = &[("\u{2019}", "'"), ("\u{2018}", "'"), ("\u{02BC}", "'")];

/// Contraction suffixes and their expansions.
pub const CONTRACTIONS: &[(&str, &str)] = &[
    ("n't", " not"),
    ("'re", " are"),
    ("'s", " is"),
    ("'d", " would"),
    ("'ll", " will"),
    ("'t", " not"),
    ("'ve", " have"),
    ("'m", " am"),
];

/// Switches for the optional normalization stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Remove `http(s)://` and `www.` links.
    pub strip_urls: bool,
    /// Remove email-like tokens.
    pub strip_emails: bool,
    /// Expand contractions such as "n't" and "'re".
    pub expand_contractions: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            strip_urls: true,
            strip_emails: true,
            expand_contractions: true,
        }
    }
}

/// Cleans raw text into the canonical form every scorer consumes.
#[derive(Clone)]
pub struct TextNormalizer {
    stages: Vec<Arc<dyn CharFilter>>,
    whitespace: PatternReplaceCharFilter,
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TextNormalizer {
    /// Build a normalizer for the given configuration.
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        let mut stages: Vec<Arc<dyn CharFilter>> = vec![
            Arc::new(UnicodeNormalizationCharFilter::new(NormalizationForm::Nfkc)),
            Arc::new(LowercaseCharFilter::new()),
            Arc::new(MappingCharFilter::new(APOSTROPHES.iter().copied())?),
        ];

        if config.strip_urls {
            stages.push(Arc::new(PatternReplaceCharFilter::new(URL_PATTERN, " ")?));
        }
        if config.strip_emails {
            stages.push(Arc::new(PatternReplaceCharFilter::new(EMAIL_PATTERN, " ")?));
        }
        stages.push(Arc::new(PatternReplaceCharFilter::new(NOISE_PATTERN, "")?));
        if config.expand_contractions {
            stages.push(Arc::new(MappingCharFilter::new(
                CONTRACTIONS.iter().copied(),
            )?));
        }

        Ok(Self {
            stages,
            whitespace: PatternReplaceCharFilter::new(WHITESPACE_PATTERN, " ")?,
        })
    }

    /// Normalize `text`. Empty or whitespace-only input yields `""`.
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let mut current = text.to_string();
        for stage in &self.stages {
            current = stage.filter(&current);
        }

        self.whitespace.filter(&current).trim().to_string()
    }

    /// Names of the char filters applied, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default()).expect("Default normalizer patterns should be valid")
    }
}
