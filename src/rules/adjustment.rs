//! Named score adjustments applied after keyword counting.
//!
//! Each adjustment is a predicate over the normalized text plus an edit of
//! the per-label scores. The adjuster runs them in a fixed order and records
//! which ones fired, so every change to a score can be traced to a rule.

use crate::label::{EmotionLabel, LabelCounts, LabelDistribution};
use crate::rules::tables::{RuleTables, TermMatch};

/// What an adjustment can see about the text.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    pub text: &'a str,
    pub words: Vec<&'a str>,
    /// Keyword counts before any adjustment.
    pub raw_counts: &'a LabelCounts,
}

impl<'a> RuleContext<'a> {
    pub fn new(text: &'a str, raw_counts: &'a LabelCounts) -> Self {
        Self {
            text,
            words: text.split_whitespace().collect(),
            raw_counts,
        }
    }

    pub fn contains(&self, matching: TermMatch, term: &str) -> bool {
        matching.contains(term, self.text, &self.words)
    }

    /// Number of distinct `terms` present in the text.
    pub fn count_present(&self, matching: TermMatch, terms: &[String]) -> usize {
        terms.iter().filter(|t| self.contains(matching, t)).count()
    }
}

/// A named, self-contained rewrite of the rule scores.
pub trait Adjustment: Send + Sync {
    fn name(&self) -> &str;

    /// Adjust `scores` in place. Returns whether the adjustment fired.
    fn apply(&self, context: &RuleContext<'_>, scores: &mut LabelDistribution) -> bool;
}

/// Scales every label that has keyword hits by each intensifier present.
#[derive(Debug, Clone)]
pub struct IntensityModifiers {
    modifiers: Vec<(String, f64)>,
    matching: TermMatch,
}

impl IntensityModifiers {
    pub fn new(modifiers: Vec<(String, f64)>, matching: TermMatch) -> Self {
        Self { modifiers, matching }
    }

    pub fn from_tables(tables: &RuleTables) -> Self {
        Self::new(
            tables
                .intensifiers
                .iter()
                .map(|(term, m)| (term.clone(), *m))
                .collect(),
            tables.intensifier_match,
        )
    }
}

impl Adjustment for IntensityModifiers {
    fn name(&self) -> &str {
        "intensity_modifiers"
    }

    fn apply(&self, context: &RuleContext<'_>, scores: &mut LabelDistribution) -> bool {
        let mut fired = false;
        for (term, multiplier) in &self.modifiers {
            if !context.contains(self.matching, term) {
                continue;
            }
            for label in EmotionLabel::ALL {
                if context.raw_counts.get(label) > 0 {
                    scores.scale(label, *multiplier);
                    fired = true;
                }
            }
        }
        fired
    }
}

/// Compares positive and negative context vocabularies and tilts the
/// scores toward whichever side dominates.
///
/// Positive context scales joy ×1.5 and love ×1.3, and damps anger ×0.3
/// once at least two positive indicators are present. Negative context
/// scales sadness ×1.3, fear ×1.2 and anger ×1.2.
#[derive(Debug, Clone)]
pub struct ContextIndicators {
    positive: Vec<String>,
    negative: Vec<String>,
    matching: TermMatch,
}

impl ContextIndicators {
    pub const JOY_BOOST: f64 = 1.5;
    pub const LOVE_BOOST: f64 = 1.3;
    pub const ANGER_DAMPING: f64 = 0.3;
    pub const MIN_POSITIVE_FOR_DAMPING: usize = 2;
    pub const SADNESS_BOOST: f64 = 1.3;
    pub const FEAR_BOOST: f64 = 1.2;
    pub const ANGER_BOOST: f64 = 1.2;

    pub fn new(positive: Vec<String>, negative: Vec<String>, matching: TermMatch) -> Self {
        Self {
            positive,
            negative,
            matching,
        }
    }

    pub fn from_tables(tables: &RuleTables) -> Self {
        Self::new(
            tables.positive_context.clone(),
            tables.negative_context.clone(),
            tables.context_match,
        )
    }
}

impl Adjustment for ContextIndicators {
    fn name(&self) -> &str {
        "context_indicators"
    }

    fn apply(&self, context: &RuleContext<'_>, scores: &mut LabelDistribution) -> bool {
        let positive = context.count_present(self.matching, &self.positive);
        let negative = context.count_present(self.matching, &self.negative);

        if positive > negative {
            scores.scale(EmotionLabel::Joy, Self::JOY_BOOST);
            scores.scale(EmotionLabel::Love, Self::LOVE_BOOST);
            if positive >= Self::MIN_POSITIVE_FOR_DAMPING {
                scores.scale(EmotionLabel::Anger, Self::ANGER_DAMPING);
            }
            true
        } else if negative > positive {
            scores.scale(EmotionLabel::Sadness, Self::SADNESS_BOOST);
            scores.scale(EmotionLabel::Fear, Self::FEAR_BOOST);
            scores.scale(EmotionLabel::Anger, Self::ANGER_BOOST);
            true
        } else {
            false
        }
    }
}

/// Assertive, motivational phrasing ("tackled", "momentum", "boss") shares
/// vocabulary with anger. When any such term is present joy is doubled and
/// anger cut to a fifth.
#[derive(Debug, Clone)]
pub struct MotivationalOverride {
    terms: Vec<String>,
    matching: TermMatch,
}

impl MotivationalOverride {
    pub const JOY_FACTOR: f64 = 2.0;
    pub const ANGER_FACTOR: f64 = 0.2;

    pub fn new(terms: Vec<String>, matching: TermMatch) -> Self {
        Self { terms, matching }
    }

    pub fn from_tables(tables: &RuleTables) -> Self {
        Self::new(tables.motivational_terms.clone(), tables.context_match)
    }
}

impl Adjustment for MotivationalOverride {
    fn name(&self) -> &str {
        "motivational_override"
    }

    fn apply(&self, context: &RuleContext<'_>, scores: &mut LabelDistribution) -> bool {
        if self.terms.iter().any(|t| context.contains(self.matching, t)) {
            scores.scale(EmotionLabel::Joy, Self::JOY_FACTOR);
            scores.scale(EmotionLabel::Anger, Self::ANGER_FACTOR);
            true
        } else {
            false
        }
    }
}
