//! The set of pre-trained classifiers and their static importance weights.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{MoodlensError, Result};
use crate::label::{EmotionLabel, LABEL_COUNT, LabelDistribution};
use crate::ml::classifier::{Capability, ClassifierHandle, LoadedClassifier};
use crate::ml::vectorizer::FeatureVector;

/// Weights and inference options of a [`ClassifierBank`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Static weight per classifier name, each in `[0, 1]`.
    pub weights: BTreeMap<String, f64>,
    /// Weight for classifiers absent from `weights`.
    pub default_weight: f64,
    /// Run classifiers on the rayon thread pool.
    pub parallel: bool,
    /// Mass placed on the predicted label when a classifier has no
    /// probability output; the rest is shared by the other labels.
    pub fallback_confidence: f64,
}

impl Default for BankConfig {
    fn default() -> Self {
        let weights = [
            ("linear_svc", 0.25),
            ("logistic_regression", 0.20),
            ("gradient_boosting", 0.20),
            ("random_forest", 0.15),
            ("naive_bayes", 0.10),
            ("knn", 0.05),
            ("decision_tree", 0.05),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();

        Self {
            weights,
            default_weight: 0.1,
            parallel: true,
            fallback_confidence: 0.8,
        }
    }
}

impl BankConfig {
    /// Weight for `name`, falling back to [`default_weight`](Self::default_weight).
    pub fn weight_for(&self, name: &str) -> f64 {
        self.weights.get(name).copied().unwrap_or(self.default_weight)
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |w: f64| w.is_finite() && (0.0..=1.0).contains(&w);
        if let Some((name, weight)) = self.weights.iter().find(|(_, w)| !in_unit(**w)) {
            return Err(MoodlensError::configuration(format!(
                "weight {weight} for '{name}' is outside [0, 1]"
            )));
        }
        if !in_unit(self.default_weight) {
            return Err(MoodlensError::configuration(format!(
                "default weight {} is outside [0, 1]",
                self.default_weight
            )));
        }
        if !in_unit(self.fallback_confidence) {
            return Err(MoodlensError::configuration(format!(
                "fallback confidence {} is outside [0, 1]",
                self.fallback_confidence
            )));
        }
        Ok(())
    }
}

/// One classifier's output for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub classifier: String,
    pub label: EmotionLabel,
    /// Highest probability, or the fallback confidence for label-only models.
    pub confidence: f64,
    pub distribution: LabelDistribution,
    pub weight: f64,
    pub capability: Capability,
    /// The classifier errored and this is the zero-weight substitute.
    pub failed: bool,
}

impl PredictionResult {
    /// Neutral, zero-confidence, zero-weight stand-in for a failed classifier.
    pub fn failure(classifier: &str, capability: Capability) -> Self {
        Self {
            classifier: classifier.to_string(),
            label: EmotionLabel::Neutral,
            confidence: 0.0,
            distribution: LabelDistribution::zero(),
            weight: 0.0,
            capability,
            failed: true,
        }
    }
}

/// Distribution synthesized for a classifier that only reports a label.
pub fn fallback_distribution(label: EmotionLabel, confidence: f64) -> LabelDistribution {
    let residual = (1.0 - confidence) / (LABEL_COUNT - 1) as f64;
    let mut dist = LabelDistribution::from_values([residual; LABEL_COUNT]);
    dist.set(label, confidence);
    dist
}

/// Pre-trained classifiers bound to their static weights.
#[derive(Debug, Clone)]
pub struct ClassifierBank {
    handles: Vec<ClassifierHandle>,
    parallel: bool,
    fallback_confidence: f64,
}

impl ClassifierBank {
    /// Bind classifiers to weights. A weight supplied by the loader wins over
    /// the configured one.
    pub fn new(config: &BankConfig, classifiers: Vec<LoadedClassifier>) -> Result<Self> {
        config.validate()?;
        if classifiers.is_empty() {
            return Err(MoodlensError::configuration("no classifiers loaded"));
        }

        let mut names = HashSet::new();
        let mut handles = Vec::with_capacity(classifiers.len());
        for loaded in classifiers {
            if !names.insert(loaded.name.clone()) {
                return Err(MoodlensError::configuration(format!(
                    "classifier '{}' is loaded twice",
                    loaded.name
                )));
            }
            let weight = loaded
                .weight
                .unwrap_or_else(|| config.weight_for(&loaded.name));
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(MoodlensError::configuration(format!(
                    "weight {weight} for '{}' is outside [0, 1]",
                    loaded.name
                )));
            }
            handles.push(ClassifierHandle::new(loaded.name, loaded.classifier, weight));
        }

        Ok(Self {
            handles,
            parallel: config.parallel,
            fallback_confidence: config.fallback_confidence,
        })
    }

    /// Classifier names in load order.
    pub fn list_classifiers(&self) -> Vec<String> {
        self.handles.iter().map(|h| h.name().to_string()).collect()
    }

    pub fn handles(&self) -> &[ClassifierHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Predict with one named classifier. Only an unknown name is an error;
    /// inference failures come back as a zero-weight fallback.
    pub fn predict(&self, name: &str, features: &FeatureVector) -> Result<PredictionResult> {
        let handle = self
            .handles
            .iter()
            .find(|h| h.name() == name)
            .ok_or_else(|| MoodlensError::configuration(format!("unknown classifier '{name}'")))?;
        Ok(self.predict_handle(handle, features))
    }

    /// Predict with every classifier, in load order.
    pub fn predict_all(&self, features: &FeatureVector) -> Vec<PredictionResult> {
        if self.parallel && self.handles.len() > 1 {
            self.handles
                .par_iter()
                .map(|handle| self.predict_handle(handle, features))
                .collect()
        } else {
            self.handles
                .iter()
                .map(|handle| self.predict_handle(handle, features))
                .collect()
        }
    }

    fn predict_handle(&self, handle: &ClassifierHandle, features: &FeatureVector) -> PredictionResult {
        match self.try_predict(handle, features) {
            Ok(result) => {
                debug!(
                    classifier = %handle.name(),
                    label = %result.label,
                    confidence = result.confidence,
                    "Classifier prediction"
                );
                result
            }
            Err(e) => {
                error!(
                    classifier = %handle.name(),
                    error = %e,
                    "Classifier inference failed, substituting zero-weight fallback"
                );
                PredictionResult::failure(handle.name(), handle.capability())
            }
        }
    }

    fn try_predict(&self, handle: &ClassifierHandle, features: &FeatureVector) -> Result<PredictionResult> {
        let classifier = handle.classifier();
        let label = classifier.predict(features)?;

        let (distribution, confidence) = match handle.capability() {
            Capability::Probabilistic => {
                let dist = classifier.predict_distribution(features)?.ok_or_else(|| {
                    MoodlensError::inference(handle.name(), "no probability output")
                })?;
                if dist.values().iter().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(MoodlensError::inference(
                        handle.name(),
                        "probabilities must be finite and non-negative",
                    ));
                }
                let dist = dist.normalized();
                if dist.is_zero() {
                    return Err(MoodlensError::inference(
                        handle.name(),
                        "probability output carries no mass",
                    ));
                }
                let confidence = dist.get(dist.argmax());
                (dist, confidence)
            }
            Capability::LabelOnly => (
                fallback_distribution(label, self.fallback_confidence),
                self.fallback_confidence,
            ),
        };

        Ok(PredictionResult {
            classifier: handle.name().to_string(),
            label,
            confidence,
            distribution,
            weight: handle.weight(),
            capability: handle.capability(),
            failed: false,
        })
    }
}
