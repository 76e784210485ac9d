//! Emotion classifier trait and the handle that binds a classifier to its
//! name and static importance weight.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::label::{EmotionLabel, LabelDistribution};
use crate::ml::vectorizer::FeatureVector;

/// Whether a classifier can report a per-label probability distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Probabilistic,
    LabelOnly,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Probabilistic => f.write_str("probabilistic"),
            Capability::LabelOnly => f.write_str("label_only"),
        }
    }
}

/// A pre-trained emotion classifier.
///
/// Implementations hold only read-only model state; one instance is shared
/// by every concurrent prediction.
pub trait EmotionClassifier: Send + Sync {
    /// Predict the most likely label.
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel>;

    /// Per-label probabilities, or `None` for label-only classifiers.
    fn predict_distribution(&self, features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        let _ = features;
        Ok(None)
    }

    /// Whether [`predict_distribution`](Self::predict_distribution) returns
    /// a distribution.
    fn capability(&self) -> Capability;

    /// Name of the model family, for debugging and logging.
    fn name(&self) -> &str;
}

/// A classifier as produced by a loader, before weights are resolved.
#[derive(Clone)]
pub struct LoadedClassifier {
    pub name: String,
    pub classifier: Arc<dyn EmotionClassifier>,
    /// Weight supplied by the loader; overrides the bank configuration.
    pub weight: Option<f64>,
}

impl LoadedClassifier {
    pub fn new<S: Into<String>>(name: S, classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self {
            name: name.into(),
            classifier,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

impl fmt::Debug for LoadedClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedClassifier")
            .field("name", &self.name)
            .field("classifier", &self.classifier.name())
            .field("weight", &self.weight)
            .finish()
    }
}

/// A classifier bound to its static name, weight and capability.
///
/// The capability is read once, when the handle is created.
#[derive(Clone)]
pub struct ClassifierHandle {
    name: String,
    classifier: Arc<dyn EmotionClassifier>,
    weight: f64,
    capability: Capability,
}

impl ClassifierHandle {
    pub fn new<S: Into<String>>(name: S, classifier: Arc<dyn EmotionClassifier>, weight: f64) -> Self {
        let capability = classifier.capability();
        Self {
            name: name.into(),
            classifier,
            weight,
            capability,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn classifier(&self) -> &Arc<dyn EmotionClassifier> {
        &self.classifier
    }
}

impl fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierHandle")
            .field("name", &self.name)
            .field("kind", &self.classifier.name())
            .field("weight", &self.weight)
            .field("capability", &self.capability)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(EmotionLabel);

    impl EmotionClassifier for Fixed {
        fn predict(&self, _features: &FeatureVector) -> Result<EmotionLabel> {
            Ok(self.0)
        }

        fn capability(&self) -> Capability {
            Capability::LabelOnly
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_handle_reads_capability_once() {
        let handle = ClassifierHandle::new("svc", Arc::new(Fixed(EmotionLabel::Joy)), 0.25);
        assert_eq!(handle.name(), "svc");
        assert_eq!(handle.weight(), 0.25);
        assert_eq!(handle.capability(), Capability::LabelOnly);

        let features = FeatureVector::zeros(2);
        assert_eq!(handle.classifier().predict(&features).unwrap(), EmotionLabel::Joy);
        assert_eq!(handle.classifier().predict_distribution(&features).unwrap(), None);
    }

    #[test]
    fn test_capability_serde() {
        assert_eq!(
            serde_json::to_string(&Capability::LabelOnly).unwrap(),
            "\"label_only\""
        );
        assert_eq!(Capability::Probabilistic.to_string(), "probabilistic");
    }
}
