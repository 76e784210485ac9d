//! k-nearest-neighbour classification over stored training vectors.

use serde::{Deserialize, Serialize};

use crate::error::{MoodlensError, Result};
use crate::label::{EmotionLabel, LabelCounts, LabelDistribution};
use crate::ml::classifier::{Capability, EmotionClassifier};
use crate::ml::models::{check_dimension, validate_finite};
use crate::ml::vectorizer::FeatureVector;

/// Stored samples and their labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnModel {
    pub k: usize,
    pub samples: Vec<Vec<f64>>,
    pub labels: Vec<EmotionLabel>,
    #[serde(skip)]
    n_features: usize,
}

impl KnnModel {
    pub fn new(k: usize, samples: Vec<Vec<f64>>, labels: Vec<EmotionLabel>) -> Self {
        Self {
            k,
            samples,
            labels,
            n_features: 0,
        }
    }

    pub fn bind(mut self, dimension: usize) -> Result<Self> {
        const KIND: &str = "knn";
        if self.k == 0 {
            return Err(MoodlensError::configuration(format!("{KIND}: k must be at least 1")));
        }
        if self.samples.is_empty() || self.samples.len() != self.labels.len() {
            return Err(MoodlensError::configuration(format!(
                "{KIND}: need one label per stored sample, got {} samples and {} labels",
                self.samples.len(),
                self.labels.len()
            )));
        }
        for sample in &self.samples {
            if sample.len() != dimension {
                return Err(MoodlensError::configuration(format!(
                    "{KIND}: sample has {} features, vocabulary has {dimension}",
                    sample.len()
                )));
            }
            validate_finite(KIND, "samples", sample)?;
        }

        self.n_features = dimension;
        Ok(self)
    }

    /// Label votes among the `k` nearest samples. Equal distances keep
    /// the stored sample order.
    fn votes(&self, features: &FeatureVector) -> Result<LabelCounts> {
        check_dimension("knn", self.n_features, features.dimension())?;
        let x = features.as_slice();

        let mut distances: Vec<(f64, usize)> = self
            .samples
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let d: f64 = sample.iter().zip(x).map(|(a, b)| (a - b) * (a - b)).sum();
                (d, i)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut counts = LabelCounts::new();
        for &(_, i) in distances.iter().take(self.k) {
            counts.increment(self.labels[i]);
        }
        Ok(counts)
    }
}

impl EmotionClassifier for KnnModel {
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel> {
        Ok(self.votes(features)?.as_distribution().argmax())
    }

    fn predict_distribution(&self, features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        Ok(Some(self.votes(features)?.as_distribution().normalized()))
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn name(&self) -> &str {
        "knn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(k: usize) -> KnnModel {
        KnnModel::new(
            k,
            vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 1.0]],
            vec![EmotionLabel::Joy, EmotionLabel::Joy, EmotionLabel::Sadness],
        )
        .bind(2)
        .unwrap()
    }

    #[test]
    fn test_vote_share() {
        let knn = model(3);
        let x = FeatureVector::from_values(vec![0.0, 1.0]).unwrap();
        let dist = knn.predict_distribution(&x).unwrap().unwrap();
        assert!((dist.get(EmotionLabel::Joy) - 2.0 / 3.0).abs() < 1e-12);
        assert!((dist.get(EmotionLabel::Sadness) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(knn.predict(&x).unwrap(), EmotionLabel::Joy);
    }

    #[test]
    fn test_nearest_neighbour() {
        let knn = model(1);
        let x = FeatureVector::from_values(vec![0.1, 0.8]).unwrap();
        assert_eq!(knn.predict(&x).unwrap(), EmotionLabel::Sadness);
    }

    #[test]
    fn test_k_larger_than_samples() {
        let knn = model(10);
        let dist = knn
            .predict_distribution(&FeatureVector::zeros(2))
            .unwrap()
            .unwrap();
        assert!((dist.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bind_validation() {
        assert!(KnnModel::new(0, vec![vec![1.0]], vec![EmotionLabel::Joy]).bind(1).is_err());
        assert!(KnnModel::new(1, vec![vec![1.0]], vec![]).bind(1).is_err());
        assert!(KnnModel::new(1, vec![vec![1.0]], vec![EmotionLabel::Joy]).bind(2).is_err());
    }
}
