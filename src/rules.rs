//! Rule-based emotion scoring, independent of the trained classifiers.
//!
//! The [`ContextRuleAdjuster`] counts label keywords in normalized text and
//! then runs an ordered list of named [`Adjustment`]s:
//!
//! 1. `intensity_modifiers` scales labels that have keyword hits by each
//!    intensifier present ("very" ×1.5, "slightly" ×0.5, ...).
//! 2. `context_indicators` tilts toward joy/love or sadness/fear/anger
//!    depending on which context vocabulary dominates.
//! 3. `motivational_override` doubles joy and cuts anger to a fifth when
//!    motivational terms such as "tackled" appear.
//!
//! Custom adjustments may be appended after the defaults.
//!
//! # Examples
//!
//! ```
//! use moodlens::label::EmotionLabel;
//! use moodlens::rules::ContextRuleAdjuster;
//!
//! let adjuster = ContextRuleAdjuster::default();
//! let scores = adjuster.score("i tackled the angry furious deadline");
//!
//! assert!(scores.raw_counts.get(EmotionLabel::Anger) > scores.raw_counts.get(EmotionLabel::Joy));
//! assert_eq!(scores.label, EmotionLabel::Joy);
//! ```

pub mod adjustment;
pub mod tables;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::label::{EmotionLabel, LabelCounts, LabelDistribution};

pub use adjustment::{
    Adjustment, ContextIndicators, IntensityModifiers, MotivationalOverride, RuleContext,
};
pub use tables::{RuleTables, TermMatch};

/// Score above which two conflicting labels are reported together.
pub const DEFAULT_CONTRADICTION_THRESHOLD: f64 = 0.3;

/// Label pairs that rarely describe the same text.
const CONFLICTS: &[(EmotionLabel, EmotionLabel)] = &[
    (EmotionLabel::Anger, EmotionLabel::Joy),
    (EmotionLabel::Anger, EmotionLabel::Love),
    (EmotionLabel::Fear, EmotionLabel::Joy),
    (EmotionLabel::Fear, EmotionLabel::Love),
    (EmotionLabel::Joy, EmotionLabel::Sadness),
    (EmotionLabel::Love, EmotionLabel::Sadness),
];

/// Output of the rule-based adjuster for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScores {
    /// Keyword occurrences per label before any adjustment.
    pub raw_counts: LabelCounts,
    /// Scores after every adjustment.
    pub scores: LabelDistribution,
    /// Keywords found per label.
    pub matched_keywords: BTreeMap<EmotionLabel, Vec<String>>,
    /// Adjustments that fired, in application order.
    pub applied: Vec<String>,
    pub total: f64,
    /// `argmax(scores)` when `total > 0`, neutral otherwise.
    pub label: EmotionLabel,
    /// `min(1, total / saturation)`. Not a probability.
    pub confidence: f64,
}

impl RuleScores {
    fn empty() -> Self {
        Self {
            raw_counts: LabelCounts::new(),
            scores: LabelDistribution::zero(),
            matched_keywords: BTreeMap::new(),
            applied: Vec::new(),
            total: 0.0,
            label: EmotionLabel::Neutral,
            confidence: 0.0,
        }
    }

    /// Adjusted scores scaled to sum to 1, or all zero.
    pub fn distribution(&self) -> LabelDistribution {
        self.scores.normalized()
    }
}

/// Keyword counter plus ordered score adjustments.
#[derive(Clone)]
pub struct ContextRuleAdjuster {
    tables: Arc<RuleTables>,
    adjustments: Vec<Arc<dyn Adjustment>>,
}

impl std::fmt::Debug for ContextRuleAdjuster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRuleAdjuster")
            .field("adjustments", &self.adjustment_names())
            .finish()
    }
}

impl Default for ContextRuleAdjuster {
    fn default() -> Self {
        Self::build(RuleTables::default())
    }
}

impl ContextRuleAdjuster {
    /// Validate the tables and set up the three default adjustments.
    pub fn new(tables: RuleTables) -> Result<Self> {
        tables.validate()?;
        Ok(Self::build(tables))
    }

    fn build(tables: RuleTables) -> Self {
        let adjustments: Vec<Arc<dyn Adjustment>> = vec![
            Arc::new(IntensityModifiers::from_tables(&tables)),
            Arc::new(ContextIndicators::from_tables(&tables)),
            Arc::new(MotivationalOverride::from_tables(&tables)),
        ];
        Self {
            tables: Arc::new(tables),
            adjustments,
        }
    }

    /// Append an adjustment that runs after the existing ones.
    pub fn with_adjustment(mut self, adjustment: Arc<dyn Adjustment>) -> Self {
        self.adjustments.push(adjustment);
        self
    }

    pub fn adjustment_names(&self) -> Vec<&str> {
        self.adjustments.iter().map(|a| a.name()).collect()
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    /// Score already-normalized text.
    pub fn score(&self, normalized: &str) -> RuleScores {
        if normalized.trim().is_empty() {
            return RuleScores::empty();
        }

        let words: Vec<&str> = normalized.split_whitespace().collect();
        let mut raw_counts = LabelCounts::new();
        let mut matched_keywords = BTreeMap::new();
        for label in EmotionLabel::ALL {
            let mut found = Vec::new();
            for keyword in self.tables.keywords_for(label) {
                let n = self.tables.keyword_match.count(keyword, normalized, &words);
                if n > 0 {
                    raw_counts.add(label, n);
                    found.push(keyword.clone());
                }
            }
            if !found.is_empty() {
                matched_keywords.insert(label, found);
            }
        }

        let context = RuleContext {
            text: normalized,
            words,
            raw_counts: &raw_counts,
        };
        let mut scores = raw_counts.as_distribution();
        let mut applied = Vec::new();
        for adjustment in &self.adjustments {
            if adjustment.apply(&context, &mut scores) {
                applied.push(adjustment.name().to_string());
            }
        }

        let total = scores.sum();
        let (label, confidence) = if total > 0.0 {
            (scores.argmax(), (total / self.tables.saturation).min(1.0))
        } else {
            (EmotionLabel::Neutral, 0.0)
        };

        RuleScores {
            raw_counts,
            scores,
            matched_keywords,
            applied,
            total,
            label,
            confidence,
        }
    }
}

/// Conflicting label pairs whose scores both exceed `threshold`, each pair
/// once, in canonical order.
pub fn detect_contradictions(
    scores: &LabelDistribution,
    threshold: f64,
) -> Vec<(EmotionLabel, EmotionLabel)> {
    CONFLICTS
        .iter()
        .copied()
        .filter(|(a, b)| scores.get(*a) > threshold && scores.get(*b) > threshold)
        .collect()
}
