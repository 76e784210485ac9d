//! Weighted combination of per-classifier predictions.
//!
//! Each label's score is the weighted sum of the classifiers' probabilities,
//! divided by the total weight of classifiers that actually contributed.
//! Failed classifiers carry zero weight, so the ensemble stays well-defined
//! whichever subset of classifiers is available.

use serde::{Deserialize, Serialize};

use crate::label::{EmotionLabel, LabelCounts, LabelDistribution};
use crate::ml::bank::PredictionResult;

/// The combined decision of every classifier for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub label: EmotionLabel,
    /// Sums to 1 whenever any classifier contributed, all zero otherwise.
    pub distribution: LabelDistribution,
    /// Probability mass on [`label`](Self::label).
    pub confidence: f64,
    /// Share of contributing classifiers whose own top label is `label`.
    pub agreement: f64,
    /// Names of the classifiers with non-zero weight.
    pub models_used: Vec<String>,
    pub predictions: Vec<PredictionResult>,
}

impl EnsembleResult {
    /// Neutral, zero-confidence result with no contributing classifiers.
    pub fn neutral(predictions: Vec<PredictionResult>) -> Self {
        Self {
            label: EmotionLabel::Neutral,
            distribution: LabelDistribution::zero(),
            confidence: 0.0,
            agreement: 0.0,
            models_used: Vec::new(),
            predictions,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.models_used.is_empty()
    }
}

/// Combines [`PredictionResult`]s into an [`EnsembleResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedEnsembleAggregator;

impl WeightedEnsembleAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, predictions: Vec<PredictionResult>) -> EnsembleResult {
        let total_weight: f64 = predictions
            .iter()
            .filter(|p| p.weight > 0.0)
            .map(|p| p.weight)
            .sum();
        if total_weight <= 0.0 {
            return EnsembleResult::neutral(predictions);
        }

        // A lone contributor's share is exactly 1.0.
        let mut distribution = LabelDistribution::zero();
        let mut models_used = Vec::new();
        for prediction in predictions.iter().filter(|p| p.weight > 0.0) {
            let share = prediction.weight / total_weight;
            for (label, p) in prediction.distribution.iter() {
                distribution.add(label, p * share);
            }
            models_used.push(prediction.classifier.clone());
        }

        let label = distribution.argmax();
        let confidence = distribution.get(label).clamp(0.0, 1.0);

        let agreeing = predictions
            .iter()
            .filter(|p| p.weight > 0.0 && p.label == label)
            .count();
        let agreement = agreeing as f64 / models_used.len() as f64;

        EnsembleResult {
            label,
            distribution,
            confidence,
            agreement,
            models_used,
            predictions,
        }
    }
}

/// Spread of the individual classifiers' confidences for one result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceAnalysis {
    pub mean_confidence: f64,
    /// Population standard deviation.
    pub std_confidence: f64,
    /// First classifier in load order with the highest confidence.
    pub most_confident: Option<String>,
    pub label_votes: LabelCounts,
    pub agreement: f64,
}

impl ConfidenceAnalysis {
    pub fn from_result(result: &EnsembleResult) -> Self {
        let confidences: Vec<f64> = result.predictions.iter().map(|p| p.confidence).collect();
        let n = confidences.len() as f64;

        let (mean_confidence, std_confidence) = if confidences.is_empty() {
            (0.0, 0.0)
        } else {
            let mean = confidences.iter().sum::<f64>() / n;
            let variance = confidences.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
            (mean, variance.sqrt())
        };

        let mut most_confident: Option<&PredictionResult> = None;
        for prediction in &result.predictions {
            if most_confident.is_none_or(|best| prediction.confidence > best.confidence) {
                most_confident = Some(prediction);
            }
        }

        let mut label_votes = LabelCounts::new();
        for prediction in &result.predictions {
            label_votes.increment(prediction.label);
        }

        Self {
            mean_confidence,
            std_confidence,
            most_confident: most_confident.map(|p| p.classifier.clone()),
            label_votes,
            agreement: result.agreement,
        }
    }
}

/// One classifier's prediction set against the ensemble decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub classifier: String,
    pub label: EmotionLabel,
    pub confidence: f64,
    pub weight: f64,
    pub agrees_with_ensemble: bool,
}

impl ModelComparison {
    pub fn from_result(result: &EnsembleResult) -> Vec<Self> {
        result
            .predictions
            .iter()
            .map(|p| Self {
                classifier: p.classifier.clone(),
                label: p.label,
                confidence: p.confidence,
                weight: p.weight,
                agrees_with_ensemble: p.label == result.label,
            })
            .collect()
    }
}

/// Classifier family best suited to a text of this length.
pub fn recommend_classifier(text: &str) -> &'static str {
    match text.split_whitespace().count() {
        0..5 => "linear_svc",
        5..15 => "logistic_regression",
        _ => "gradient_boosting",
    }
}
