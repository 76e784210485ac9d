//! Serialized formats of the pre-trained classifiers.
//!
//! Every model file is a JSON object tagged by `kind`:
//!
//! ```json
//! { "kind": "logistic_regression", "classes": ["joy", "sadness"],
//!   "coef": [[0.5, -0.2], [-0.5, 0.2]], "intercept": [0.0, 0.0] }
//! ```
//!
//! A model is validated against the vocabulary's feature dimension when it
//! is turned into a classifier, so a mismatched model fails at load time
//! rather than on the first prediction.

pub mod knn;
pub mod linear;
pub mod naive_bayes;
pub mod tree;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MoodlensError, Result};
use crate::label::{EmotionLabel, LabelDistribution};
use crate::ml::classifier::EmotionClassifier;

pub use knn::KnnModel;
pub use linear::{LinearModel, LinearSvc, LogisticRegression};
pub use naive_bayes::NaiveBayesModel;
pub use tree::{DecisionTreeModel, GradientBoostingModel, RandomForestModel, TreeNode};

/// A pre-trained model of any supported family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    LinearSvc(LinearModel),
    LogisticRegression(LinearModel),
    NaiveBayes(NaiveBayesModel),
    Knn(KnnModel),
    DecisionTree(DecisionTreeModel),
    RandomForest(RandomForestModel),
    GradientBoosting(GradientBoostingModel),
}

impl ModelSpec {
    /// Parse a tagged JSON model.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The `kind` tag of this model.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::LinearSvc(_) => "linear_svc",
            ModelSpec::LogisticRegression(_) => "logistic_regression",
            ModelSpec::NaiveBayes(_) => "naive_bayes",
            ModelSpec::Knn(_) => "knn",
            ModelSpec::DecisionTree(_) => "decision_tree",
            ModelSpec::RandomForest(_) => "random_forest",
            ModelSpec::GradientBoosting(_) => "gradient_boosting",
        }
    }

    /// Validate against the feature dimension and build the classifier.
    pub fn into_classifier(self, dimension: usize) -> Result<Arc<dyn EmotionClassifier>> {
        let classifier: Arc<dyn EmotionClassifier> = match self {
            ModelSpec::LinearSvc(model) => Arc::new(LinearSvc::new(model.bind(dimension)?)),
            ModelSpec::LogisticRegression(model) => {
                Arc::new(LogisticRegression::new(model.bind(dimension)?))
            }
            ModelSpec::NaiveBayes(model) => Arc::new(model.bind(dimension)?),
            ModelSpec::Knn(model) => Arc::new(model.bind(dimension)?),
            ModelSpec::DecisionTree(model) => Arc::new(model.bind(dimension)?),
            ModelSpec::RandomForest(model) => Arc::new(model.bind(dimension)?),
            ModelSpec::GradientBoosting(model) => Arc::new(model.bind(dimension)?),
        };
        Ok(classifier)
    }
}

pub(crate) fn all_classes() -> Vec<EmotionLabel> {
    EmotionLabel::ALL.to_vec()
}

/// Check that a class list is non-empty and free of duplicates.
pub(crate) fn validate_classes(kind: &str, classes: &[EmotionLabel]) -> Result<()> {
    if classes.is_empty() {
        return Err(MoodlensError::configuration(format!(
            "{kind}: classes must not be empty"
        )));
    }
    let mut seen = [false; crate::label::LABEL_COUNT];
    for label in classes {
        if std::mem::replace(&mut seen[label.index()], true) {
            return Err(MoodlensError::configuration(format!(
                "{kind}: class '{label}' is listed twice"
            )));
        }
    }
    Ok(())
}

pub(crate) fn validate_finite(kind: &str, what: &str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(MoodlensError::configuration(format!(
            "{kind}: {what} contains non-finite values"
        )))
    }
}

/// Fail an inference whose input does not match the bound dimension.
pub(crate) fn check_dimension(kind: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MoodlensError::inference(
            kind,
            format!("expected {expected} features, got {actual}"),
        ))
    }
}

/// Softmax with max subtraction.
pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Place per-class values onto the full label set; absent labels get 0.
pub(crate) fn spread(classes: &[EmotionLabel], values: &[f64]) -> LabelDistribution {
    let mut dist = LabelDistribution::zero();
    for (label, value) in classes.iter().zip(values) {
        dist.set(*label, *value);
    }
    dist
}

/// Class with the highest score; ties go to the label first in canonical order.
pub(crate) fn best_class(classes: &[EmotionLabel], scores: &[f64]) -> EmotionLabel {
    let mut best: Option<(EmotionLabel, f64)> = None;
    for (&label, &score) in classes.iter().zip(scores) {
        best = match best {
            Some((current, top))
                if top > score || (top == score && current.index() < label.index()) =>
            {
                Some((current, top))
            }
            _ => Some((label, score)),
        };
    }
    best.map(|(label, _)| label).unwrap_or_default()
}
