//! Multinomial naive Bayes.

use serde::{Deserialize, Serialize};

use crate::error::{MoodlensError, Result};
use crate::label::{EmotionLabel, LabelDistribution};
use crate::ml::classifier::{Capability, EmotionClassifier};
use crate::ml::models::{
    all_classes, best_class, check_dimension, softmax, spread, validate_classes, validate_finite,
};
use crate::ml::vectorizer::FeatureVector;

/// Log priors and per-feature log probabilities of a fitted multinomial NB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    #[serde(default = "all_classes")]
    pub classes: Vec<EmotionLabel>,
    pub class_log_prior: Vec<f64>,
    /// `classes.len()` rows of `n_features` log probabilities.
    pub feature_log_prob: Vec<Vec<f64>>,
    #[serde(skip)]
    n_features: usize,
}

impl NaiveBayesModel {
    pub fn new(
        classes: Vec<EmotionLabel>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            classes,
            class_log_prior,
            feature_log_prob,
            n_features: 0,
        }
    }

    pub fn bind(mut self, dimension: usize) -> Result<Self> {
        const KIND: &str = "naive_bayes";
        validate_classes(KIND, &self.classes)?;
        if self.class_log_prior.len() != self.classes.len()
            || self.feature_log_prob.len() != self.classes.len()
        {
            return Err(MoodlensError::configuration(format!(
                "{KIND}: expected {} priors and probability rows",
                self.classes.len()
            )));
        }
        validate_finite(KIND, "class_log_prior", &self.class_log_prior)?;
        for row in &self.feature_log_prob {
            if row.len() != dimension {
                return Err(MoodlensError::configuration(format!(
                    "{KIND}: probability row has {} features, vocabulary has {dimension}",
                    row.len()
                )));
            }
            validate_finite(KIND, "feature_log_prob", row)?;
        }

        self.n_features = dimension;
        Ok(self)
    }

    /// Joint log likelihood of each class.
    fn joint_log_likelihood(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        check_dimension("naive_bayes", self.n_features, features.dimension())?;
        let x = features.as_slice();
        Ok(self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, row)| prior + row.iter().zip(x).map(|(p, v)| p * v).sum::<f64>())
            .collect())
    }
}

impl EmotionClassifier for NaiveBayesModel {
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel> {
        let jll = self.joint_log_likelihood(features)?;
        Ok(best_class(&self.classes, &jll))
    }

    fn predict_distribution(&self, features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        let jll = self.joint_log_likelihood(features)?;
        Ok(Some(spread(&self.classes, &softmax(&jll))))
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn name(&self) -> &str {
        "naive_bayes"
    }
}
