//! One-vs-rest linear models: support vector classification (label only)
//! and multinomial logistic regression.

use serde::{Deserialize, Serialize};

use crate::error::{MoodlensError, Result};
use crate::label::{EmotionLabel, LabelDistribution};
use crate::ml::classifier::{Capability, EmotionClassifier};
use crate::ml::models::{
    all_classes, best_class, check_dimension, softmax, spread, validate_classes, validate_finite,
};
use crate::ml::vectorizer::FeatureVector;

/// Weights of a linear decision function, one row per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default = "all_classes")]
    pub classes: Vec<EmotionLabel>,
    /// `classes.len()` rows of `n_features` coefficients.
    pub coef: Vec<Vec<f64>>,
    /// One intercept per class.
    pub intercept: Vec<f64>,
    #[serde(skip)]
    n_features: usize,
}

impl LinearModel {
    pub fn new(classes: Vec<EmotionLabel>, coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Self {
        Self {
            classes,
            coef,
            intercept,
            n_features: 0,
        }
    }

    /// Validate the weights against the feature dimension.
    pub fn bind(mut self, dimension: usize) -> Result<Self> {
        const KIND: &str = "linear";
        validate_classes(KIND, &self.classes)?;
        if self.coef.len() != self.classes.len() || self.intercept.len() != self.classes.len() {
            return Err(MoodlensError::configuration(format!(
                "{KIND}: expected {} coefficient rows and intercepts, got {} and {}",
                self.classes.len(),
                self.coef.len(),
                self.intercept.len()
            )));
        }
        for row in &self.coef {
            if row.len() != dimension {
                return Err(MoodlensError::configuration(format!(
                    "{KIND}: coefficient row has {} features, vocabulary has {dimension}",
                    row.len()
                )));
            }
            validate_finite(KIND, "coef", row)?;
        }
        validate_finite(KIND, "intercept", &self.intercept)?;

        self.n_features = dimension;
        Ok(self)
    }

    /// `coef · x + intercept` for every class.
    pub fn decision_function(&self, features: &FeatureVector) -> Vec<f64> {
        let x = features.as_slice();
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect()
    }
}

/// Linear support vector classifier. Exposes no probabilities.
#[derive(Debug, Clone)]
pub struct LinearSvc {
    model: LinearModel,
}

impl LinearSvc {
    pub fn new(model: LinearModel) -> Self {
        Self { model }
    }
}

impl EmotionClassifier for LinearSvc {
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel> {
        check_dimension(self.name(), self.model.n_features, features.dimension())?;
        let scores = self.model.decision_function(features);
        Ok(best_class(&self.model.classes, &scores))
    }

    fn capability(&self) -> Capability {
        Capability::LabelOnly
    }

    fn name(&self) -> &str {
        "linear_svc"
    }
}

/// Multinomial logistic regression.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    model: LinearModel,
}

impl LogisticRegression {
    pub fn new(model: LinearModel) -> Self {
        Self { model }
    }

    fn probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        check_dimension(self.name(), self.model.n_features, features.dimension())?;
        Ok(softmax(&self.model.decision_function(features)))
    }
}

impl EmotionClassifier for LogisticRegression {
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel> {
        let probs = self.probabilities(features)?;
        Ok(best_class(&self.model.classes, &probs))
    }

    fn predict_distribution(&self, features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        let probs = self.probabilities(features)?;
        Ok(Some(spread(&self.model.classes, &probs)))
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LinearModel {
        LinearModel::new(
            vec![EmotionLabel::Joy, EmotionLabel::Sadness, EmotionLabel::Anger],
            vec![vec![2.0, 0.0], vec![0.0, 2.0], vec![0.0, 0.0]],
            vec![0.0, 0.0, 0.5],
        )
    }

    #[test]
    fn test_svc_predicts_highest_score() {
        let svc = LinearSvc::new(model().bind(2).unwrap());
        let x = FeatureVector::from_values(vec![1.0, 0.0]).unwrap();
        assert_eq!(svc.predict(&x).unwrap(), EmotionLabel::Joy);
        assert_eq!(svc.predict_distribution(&x).unwrap(), None);

        let empty = FeatureVector::zeros(2);
        assert_eq!(svc.predict(&empty).unwrap(), EmotionLabel::Anger);
    }

    #[test]
    fn test_logistic_distribution_covers_declared_classes() {
        let lr = LogisticRegression::new(model().bind(2).unwrap());
        let x = FeatureVector::from_values(vec![0.0, 1.0]).unwrap();
        let dist = lr.predict_distribution(&x).unwrap().unwrap();

        assert!((dist.sum() - 1.0).abs() < 1e-12);
        assert_eq!(dist.get(EmotionLabel::Love), 0.0);
        assert_eq!(dist.argmax(), EmotionLabel::Sadness);
        assert_eq!(lr.predict(&x).unwrap(), EmotionLabel::Sadness);
    }

    #[test]
    fn test_dimension_mismatch_at_inference() {
        let lr = LogisticRegression::new(model().bind(2).unwrap());
        let err = lr.predict(&FeatureVector::zeros(5)).unwrap_err();
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_bind_rejects_bad_shapes() {
        let mut bad = model();
        bad.intercept.pop();
        assert!(bad.bind(2).is_err());

        assert!(model().bind(3).is_err());

        let mut nan = model();
        nan.coef[0][0] = f64::NAN;
        assert!(nan.bind(2).is_err());
    }
}
