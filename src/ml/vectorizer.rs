//! TF-IDF feature extraction against a pre-fitted vocabulary.
//!
//! The vocabulary, idf weights and weighting options are produced at training
//! time and loaded as a [`VocabularyTable`]. Inference never grows the
//! vocabulary: unknown terms are ignored.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token_filter::{LowercaseFilter, ShingleFilter, StopFilter};
use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer, WhitespaceTokenizer};
use crate::error::{MoodlensError, Result};

/// Vector normalization applied after idf weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

/// How terms were split when the vocabulary was fitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSplit {
    /// Runs of two or more word characters.
    #[default]
    Word,
    /// Whitespace-separated chunks, single characters included.
    Whitespace,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// A pre-fitted vocabulary with its weighting options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTable {
    /// Term (or space-joined n-gram) to feature index.
    pub terms: HashMap<String, usize>,
    /// Inverse document frequency per feature index. Empty disables idf.
    #[serde(default)]
    pub idf: Vec<f64>,
    #[serde(default)]
    pub term_split: TermSplit,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    /// Drop English stop words before counting.
    #[serde(default)]
    pub stop_words: bool,
    /// Replace raw term frequency `tf` with `1 + ln(tf)`.
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
}

impl VocabularyTable {
    /// Build a table with default options, assigning indices in the given order.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term.into(), index))
            .collect();
        Self {
            terms,
            idf: Vec::new(),
            term_split: TermSplit::default(),
            ngram_range: default_ngram_range(),
            stop_words: false,
            sublinear_tf: false,
            norm: Norm::default(),
        }
    }

    pub fn with_idf(mut self, idf: Vec<f64>) -> Self {
        self.idf = idf;
        self
    }

    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_term_split(mut self, term_split: TermSplit) -> Self {
        self.term_split = term_split;
        self
    }

    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = (min, max);
        self
    }

    /// Number of features.
    pub fn dimension(&self) -> usize {
        self.terms.len()
    }

    /// Check that the table describes a well-formed feature space.
    pub fn validate(&self) -> Result<()> {
        let dimension = self.terms.len();
        if dimension == 0 {
            return Err(MoodlensError::configuration("vocabulary is empty"));
        }

        let mut seen = vec![false; dimension];
        for (term, &index) in &self.terms {
            if index >= dimension {
                return Err(MoodlensError::configuration(format!(
                    "term '{term}' has index {index} outside 0..{dimension}"
                )));
            }
            if seen[index] {
                return Err(MoodlensError::configuration(format!(
                    "feature index {index} is assigned to more than one term"
                )));
            }
            seen[index] = true;
        }

        if !self.idf.is_empty() {
            if self.idf.len() != dimension {
                return Err(MoodlensError::configuration(format!(
                    "idf has {} entries but the vocabulary has {dimension} terms",
                    self.idf.len()
                )));
            }
            if let Some(bad) = self.idf.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(MoodlensError::configuration(format!(
                    "idf weights must be finite and non-negative, found {bad}"
                )));
            }
        }

        let (min, max) = self.ngram_range;
        if min == 0 || min > max {
            return Err(MoodlensError::configuration(format!(
                "invalid ngram range ({min}, {max})"
            )));
        }

        Ok(())
    }
}

/// A fixed-dimension vector of non-negative feature weights.
///
/// Owned by the call that produced it and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw values, rejecting negative or non-finite entries.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(MoodlensError::invalid_argument(format!(
                "feature values must be finite and non-negative, found {bad}"
            )));
        }
        Ok(Self { values })
    }

    pub fn zeros(dimension: usize) -> Self {
        Self {
            values: vec![0.0; dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }

    pub fn is_zero(&self) -> bool {
        self.nnz() == 0
    }
}

struct LoadedVocabulary {
    table: VocabularyTable,
    analyzer: PipelineAnalyzer,
}

/// Converts normalized text into a [`FeatureVector`].
#[derive(Clone)]
pub struct FeatureVectorizer {
    loaded: Option<Arc<LoadedVocabulary>>,
}

impl std::fmt::Debug for FeatureVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("FeatureVectorizer");
        match &self.loaded {
            Some(loaded) => debug
                .field("vocabulary_size", &loaded.table.dimension())
                .field("analyzer", &loaded.analyzer.name())
                .finish(),
            None => debug.field("vocabulary_size", &0).finish(),
        }
    }
}

impl FeatureVectorizer {
    /// Create a vectorizer over a validated vocabulary table.
    pub fn new(table: VocabularyTable) -> Result<Self> {
        table.validate()?;

        let tokenizer: Arc<dyn Tokenizer> = match table.term_split {
            TermSplit::Word => Arc::new(RegexTokenizer::new()?),
            TermSplit::Whitespace => Arc::new(WhitespaceTokenizer::new()),
        };
        let mut analyzer = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LowercaseFilter::new()));
        if table.stop_words {
            analyzer = analyzer.add_filter(Arc::new(StopFilter::new()));
        }
        let (min, max) = table.ngram_range;
        if (min, max) != (1, 1) {
            analyzer = analyzer.add_filter(Arc::new(ShingleFilter::new(min, max)?));
        }
        let analyzer = analyzer.with_name("vectorizer");

        Ok(Self {
            loaded: Some(Arc::new(LoadedVocabulary { table, analyzer })),
        })
    }

    /// A vectorizer with no vocabulary. Every call to
    /// [`vectorize`](Self::vectorize) fails with a configuration error.
    pub fn unloaded() -> Self {
        Self { loaded: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Feature dimension, or 0 when unloaded.
    pub fn dimension(&self) -> usize {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.table.dimension())
            .unwrap_or(0)
    }

    /// Vectorize already-normalized text.
    pub fn vectorize(&self, normalized: &str) -> Result<FeatureVector> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| MoodlensError::configuration("no vocabulary loaded"))?;
        let table = &loaded.table;

        let mut weights = vec![0.0_f64; table.dimension()];
        for token in loaded.analyzer.analyze(normalized)? {
            if let Some(&index) = table.terms.get(&token.text) {
                weights[index] += 1.0;
            }
        }

        if table.sublinear_tf {
            for weight in weights.iter_mut().filter(|w| **w > 0.0) {
                *weight = 1.0 + weight.ln();
            }
        }

        if !table.idf.is_empty() {
            for (weight, idf) in weights.iter_mut().zip(&table.idf) {
                *weight *= idf;
            }
        }

        let norm = match table.norm {
            Norm::L2 => weights.iter().map(|w| w * w).sum::<f64>().sqrt(),
            Norm::L1 => weights.iter().sum::<f64>(),
            Norm::None => 1.0,
        };
        if norm > 0.0 && norm != 1.0 {
            for weight in &mut weights {
                *weight /= norm;
            }
        }

        Ok(FeatureVector { values: weights })
    }
}
