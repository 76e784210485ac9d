//! Tree models: a single decision tree, a random forest of them, and
//! gradient-boosted regression trees.

use serde::{Deserialize, Serialize};

use crate::error::{MoodlensError, Result};
use crate::label::{EmotionLabel, LabelDistribution};
use crate::ml::classifier::{Capability, EmotionClassifier};
use crate::ml::models::{
    all_classes, best_class, check_dimension, softmax, spread, validate_classes, validate_finite,
};
use crate::ml::vectorizer::FeatureVector;

/// A node of a binary decision tree. `x[feature] <= threshold` goes left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        values: Vec<f64>,
    },
}

impl TreeNode {
    pub fn leaf(values: Vec<f64>) -> Self {
        TreeNode::Leaf { values }
    }

    pub fn split(feature: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Values of the leaf reached by `x`.
    pub fn evaluate(&self, x: &[f64]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
                TreeNode::Leaf { values } => return values,
            }
        }
    }

    /// Check split features and leaf widths. Class-weight leaves must also
    /// carry some positive mass.
    fn validate(&self, kind: &str, dimension: usize, width: usize, weights: bool) -> Result<()> {
        match self {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= dimension {
                    return Err(MoodlensError::configuration(format!(
                        "{kind}: split on feature {feature}, vocabulary has {dimension}"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(MoodlensError::configuration(format!(
                        "{kind}: split threshold must be finite"
                    )));
                }
                left.validate(kind, dimension, width, weights)?;
                right.validate(kind, dimension, width, weights)
            }
            TreeNode::Leaf { values } => {
                if values.len() != width {
                    return Err(MoodlensError::configuration(format!(
                        "{kind}: leaf has {} values, expected {width}",
                        values.len()
                    )));
                }
                validate_finite(kind, "leaf", values)?;
                if weights && (values.iter().any(|v| *v < 0.0) || values.iter().sum::<f64>() <= 0.0)
                {
                    return Err(MoodlensError::configuration(format!(
                        "{kind}: leaf class weights must be non-negative with a positive sum"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Class weights at the reached leaf, normalized.
    fn class_probabilities(&self, x: &[f64]) -> Vec<f64> {
        let values = self.evaluate(x);
        let total: f64 = values.iter().sum();
        values.iter().map(|v| v / total).collect()
    }
}

/// A single classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeModel {
    #[serde(default = "all_classes")]
    pub classes: Vec<EmotionLabel>,
    pub root: TreeNode,
    #[serde(skip)]
    n_features: usize,
}

impl DecisionTreeModel {
    pub fn new(classes: Vec<EmotionLabel>, root: TreeNode) -> Self {
        Self {
            classes,
            root,
            n_features: 0,
        }
    }

    pub fn bind(mut self, dimension: usize) -> Result<Self> {
        validate_classes("decision_tree", &self.classes)?;
        self.root
            .validate("decision_tree", dimension, self.classes.len(), true)?;
        self.n_features = dimension;
        Ok(self)
    }

    fn probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        check_dimension("decision_tree", self.n_features, features.dimension())?;
        Ok(self.root.class_probabilities(features.as_slice()))
    }
}

impl EmotionClassifier for DecisionTreeModel {
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel> {
        Ok(best_class(&self.classes, &self.probabilities(features)?))
    }

    fn predict_distribution(&self, features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        Ok(Some(spread(&self.classes, &self.probabilities(features)?)))
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

/// Classification trees averaged together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    #[serde(default = "all_classes")]
    pub classes: Vec<EmotionLabel>,
    pub trees: Vec<TreeNode>,
    #[serde(skip)]
    n_features: usize,
}

impl RandomForestModel {
    pub fn new(classes: Vec<EmotionLabel>, trees: Vec<TreeNode>) -> Self {
        Self {
            classes,
            trees,
            n_features: 0,
        }
    }

    pub fn bind(mut self, dimension: usize) -> Result<Self> {
        const KIND: &str = "random_forest";
        validate_classes(KIND, &self.classes)?;
        if self.trees.is_empty() {
            return Err(MoodlensError::configuration(format!(
                "{KIND}: forest has no trees"
            )));
        }
        for tree in &self.trees {
            tree.validate(KIND, dimension, self.classes.len(), true)?;
        }
        self.n_features = dimension;
        Ok(self)
    }

    fn probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        check_dimension("random_forest", self.n_features, features.dimension())?;
        let x = features.as_slice();
        let mut mean = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in mean.iter_mut().zip(tree.class_probabilities(x)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(mean.into_iter().map(|p| p / n).collect())
    }
}

impl EmotionClassifier for RandomForestModel {
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel> {
        Ok(best_class(&self.classes, &self.probabilities(features)?))
    }

    fn predict_distribution(&self, features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        Ok(Some(spread(&self.classes, &self.probabilities(features)?)))
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

fn default_learning_rate() -> f64 {
    0.1
}

/// Gradient-boosted regression trees with one tree per class per stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingModel {
    #[serde(default = "all_classes")]
    pub classes: Vec<EmotionLabel>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Initial raw score per class.
    pub init: Vec<f64>,
    /// Boosting stages; each holds `classes.len()` single-value regression trees.
    pub stages: Vec<Vec<TreeNode>>,
    #[serde(skip)]
    n_features: usize,
}

impl GradientBoostingModel {
    pub fn new(
        classes: Vec<EmotionLabel>,
        learning_rate: f64,
        init: Vec<f64>,
        stages: Vec<Vec<TreeNode>>,
    ) -> Self {
        Self {
            classes,
            learning_rate,
            init,
            stages,
            n_features: 0,
        }
    }

    pub fn bind(mut self, dimension: usize) -> Result<Self> {
        const KIND: &str = "gradient_boosting";
        validate_classes(KIND, &self.classes)?;
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(MoodlensError::configuration(format!(
                "{KIND}: learning rate must be positive"
            )));
        }
        if self.init.len() != self.classes.len() {
            return Err(MoodlensError::configuration(format!(
                "{KIND}: expected {} initial scores, got {}",
                self.classes.len(),
                self.init.len()
            )));
        }
        validate_finite(KIND, "init", &self.init)?;
        for stage in &self.stages {
            if stage.len() != self.classes.len() {
                return Err(MoodlensError::configuration(format!(
                    "{KIND}: stage has {} trees, expected {}",
                    stage.len(),
                    self.classes.len()
                )));
            }
            for tree in stage {
                tree.validate(KIND, dimension, 1, false)?;
            }
        }
        self.n_features = dimension;
        Ok(self)
    }

    fn raw_scores(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        check_dimension("gradient_boosting", self.n_features, features.dimension())?;
        let x = features.as_slice();
        let mut scores = self.init.clone();
        for stage in &self.stages {
            for (score, tree) in scores.iter_mut().zip(stage) {
                *score += self.learning_rate * tree.evaluate(x)[0];
            }
        }
        Ok(scores)
    }
}

impl EmotionClassifier for GradientBoostingModel {
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel> {
        Ok(best_class(&self.classes, &self.raw_scores(features)?))
    }

    fn predict_distribution(&self, features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        let probs = softmax(&self.raw_scores(features)?);
        Ok(Some(spread(&self.classes, &probs)))
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn name(&self) -> &str {
        "gradient_boosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<EmotionLabel> {
        vec![EmotionLabel::Joy, EmotionLabel::Sadness]
    }

    /// Feature 0 above 0.5 means joy, otherwise sadness.
    fn stump() -> TreeNode {
        TreeNode::split(0, 0.5, TreeNode::leaf(vec![1.0, 3.0]), TreeNode::leaf(vec![4.0, 0.0]))
    }

    #[test]
    fn test_decision_tree() {
        let tree = DecisionTreeModel::new(classes(), stump()).bind(2).unwrap();
        let low = FeatureVector::from_values(vec![0.2, 0.0]).unwrap();
        let dist = tree.predict_distribution(&low).unwrap().unwrap();
        assert_eq!(dist.get(EmotionLabel::Sadness), 0.75);
        assert_eq!(tree.predict(&low).unwrap(), EmotionLabel::Sadness);

        let high = FeatureVector::from_values(vec![0.9, 0.0]).unwrap();
        assert_eq!(tree.predict(&high).unwrap(), EmotionLabel::Joy);
    }

    #[test]
    fn test_random_forest_averages() {
        let forest = RandomForestModel::new(
            classes(),
            vec![stump(), TreeNode::leaf(vec![1.0, 1.0])],
        )
        .bind(2)
        .unwrap();
        let low = FeatureVector::from_values(vec![0.0, 0.0]).unwrap();
        let dist = forest.predict_distribution(&low).unwrap().unwrap();
        assert!((dist.get(EmotionLabel::Sadness) - 0.625).abs() < 1e-12);
        assert!((dist.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_boosting() {
        let up = TreeNode::split(1, 0.0, TreeNode::leaf(vec![0.0]), TreeNode::leaf(vec![10.0]));
        let flat = TreeNode::leaf(vec![0.0]);
        let model = GradientBoostingModel::new(classes(), 0.5, vec![0.0, 1.0], vec![vec![up, flat]])
            .bind(2)
            .unwrap();

        let off = FeatureVector::zeros(2);
        assert_eq!(model.predict(&off).unwrap(), EmotionLabel::Sadness);

        let on = FeatureVector::from_values(vec![0.0, 1.0]).unwrap();
        assert_eq!(model.predict(&on).unwrap(), EmotionLabel::Joy);
        let dist = model.predict_distribution(&on).unwrap().unwrap();
        assert!((dist.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        assert!(DecisionTreeModel::new(classes(), stump()).bind(0).is_err());
        assert!(
            DecisionTreeModel::new(classes(), TreeNode::leaf(vec![0.0, 0.0]))
                .bind(1)
                .is_err()
        );
        assert!(RandomForestModel::new(classes(), vec![]).bind(1).is_err());
        assert!(
            GradientBoostingModel::new(classes(), 0.1, vec![0.0], vec![])
                .bind(1)
                .is_err()
        );
    }

    #[test]
    fn test_tree_json() {
        let json = r#"{
            "node": "split", "feature": 0, "threshold": 0.5,
            "left": {"node": "leaf", "values": [1.0, 0.0]},
            "right": {"node": "leaf", "values": [0.0, 1.0]}
        }"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.evaluate(&[0.7]), &[0.0, 1.0]);
    }
}
