use std::sync::Arc;

use moodlens::config::EngineConfig;
use moodlens::engine::EmotionEngine;
use moodlens::error::{MoodlensError, Result};
use moodlens::label::{EmotionLabel, LabelDistribution};
use moodlens::loader::StaticLoader;
use moodlens::ml::{Capability, EmotionClassifier, FeatureVector, VocabularyTable};

const CLASSIFIERS: [&str; 7] = [
    "linear_svc",
    "logistic_regression",
    "gradient_boosting",
    "random_forest",
    "naive_bayes",
    "knn",
    "decision_tree",
];

/// Returns the same distribution for every input.
struct Stub {
    distribution: LabelDistribution,
    capability: Capability,
}

impl Stub {
    fn probabilistic(distribution: LabelDistribution) -> Arc<Self> {
        Arc::new(Self {
            distribution,
            capability: Capability::Probabilistic,
        })
    }

    fn label_only(label: EmotionLabel) -> Arc<Self> {
        Arc::new(Self {
            distribution: LabelDistribution::one_hot(label),
            capability: Capability::LabelOnly,
        })
    }
}

impl EmotionClassifier for Stub {
    fn predict(&self, _features: &FeatureVector) -> Result<EmotionLabel> {
        Ok(self.distribution.argmax())
    }

    fn predict_distribution(&self, _features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        Ok(match self.capability {
            Capability::Probabilistic => Some(self.distribution),
            Capability::LabelOnly => None,
        })
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    fn name(&self) -> &str {
        "stub"
    }
}

struct Failing;

impl EmotionClassifier for Failing {
    fn predict(&self, _features: &FeatureVector) -> Result<EmotionLabel> {
        Err(MoodlensError::inference("failing", "weights unavailable"))
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn vocabulary() -> VocabularyTable {
    VocabularyTable::from_terms(["happy", "today", "everything", "perfectly", "sad"])
}

fn all_joy_engine() -> Result<EmotionEngine> {
    let loader = CLASSIFIERS.iter().fold(StaticLoader::new(vocabulary()), |loader, name| {
        loader.with_classifier(*name, Stub::probabilistic(LabelDistribution::one_hot(EmotionLabel::Joy)))
    });
    EmotionEngine::load(EngineConfig::default(), &loader)
}

#[test]
fn unanimous_joy_ensemble_agrees_fully() -> Result<()> {
    let engine = all_joy_engine()?;
    assert_eq!(engine.list_classifiers(), CLASSIFIERS.to_vec());

    let result = engine.analyze_ensemble("I am so happy today! Everything went perfectly.");
    assert_eq!(result.label, EmotionLabel::Joy);
    assert_eq!(result.agreement, 1.0);
    assert!((result.confidence - 1.0).abs() < 1e-9);
    assert!((result.distribution.sum() - 1.0).abs() < 1e-9);
    assert_eq!(result.models_used.len(), 7);
    Ok(())
}

#[test]
fn empty_text_is_neutral_with_zero_scores() -> Result<()> {
    let engine = all_joy_engine()?;
    for text in ["", "   ", "\n\t"] {
        let result = engine.analyze_ensemble(text);
        assert_eq!(result.label, EmotionLabel::Neutral);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.agreement, 0.0);
    }
    Ok(())
}

#[test]
fn single_contributing_classifier_passes_through() -> Result<()> {
    let mut own = LabelDistribution::zero();
    own.set(EmotionLabel::Fear, 0.5);
    own.set(EmotionLabel::Sadness, 0.25);
    own.set(EmotionLabel::Surprise, 0.25);

    let loader = StaticLoader::new(vocabulary())
        .with_weighted_classifier("knn", Stub::probabilistic(own), 0.5)
        .with_weighted_classifier(
            "naive_bayes",
            Stub::probabilistic(LabelDistribution::one_hot(EmotionLabel::Joy)),
            0.0,
        )
        .with_weighted_classifier("linear_svc", Stub::label_only(EmotionLabel::Anger), 0.0);
    let engine = EmotionEngine::load(EngineConfig::default(), &loader)?;

    let result = engine.analyze_ensemble("sad today");
    assert_eq!(result.distribution, own);
    assert_eq!(result.label, EmotionLabel::Fear);
    assert_eq!(result.models_used, vec!["knn".to_string()]);
    Ok(())
}

#[test]
fn label_only_classifier_gets_synthesized_distribution() -> Result<()> {
    let loader = StaticLoader::new(vocabulary())
        .with_classifier("linear_svc", Stub::label_only(EmotionLabel::Love));
    let engine = EmotionEngine::load(EngineConfig::default(), &loader)?;

    let result = engine.analyze_ensemble("happy");
    let prediction = &result.predictions[0];
    assert_eq!(prediction.capability, Capability::LabelOnly);
    assert_eq!(prediction.confidence, 0.8);
    assert!((prediction.distribution.get(EmotionLabel::Love) - 0.8).abs() < 1e-12);
    assert!((prediction.distribution.get(EmotionLabel::Joy) - 0.2 / 6.0).abs() < 1e-12);
    assert!((result.distribution.sum() - 1.0).abs() < 1e-9);
    assert_eq!(result.label, EmotionLabel::Love);
    Ok(())
}

#[test]
fn failing_classifier_is_replaced_and_ignored() -> Result<()> {
    let loader = StaticLoader::new(vocabulary())
        .with_classifier("linear_svc", Arc::new(Failing))
        .with_classifier(
            "logistic_regression",
            Stub::probabilistic(LabelDistribution::one_hot(EmotionLabel::Sadness)),
        );
    let engine = EmotionEngine::load(EngineConfig::default(), &loader)?;

    let result = engine.analyze_ensemble("sad");
    assert_eq!(result.label, EmotionLabel::Sadness);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.agreement, 1.0);

    let failed = &result.predictions[0];
    assert!(failed.failed);
    assert_eq!(failed.weight, 0.0);
    assert_eq!(failed.label, EmotionLabel::Neutral);
    assert!(failed.distribution.is_zero());

    let analysis = engine.confidence_analysis("sad");
    assert_eq!(analysis.most_confident.as_deref(), Some("logistic_regression"));
    assert_eq!(analysis.mean_confidence, 0.5);
    Ok(())
}

#[test]
fn all_classifiers_failing_degrades_to_neutral() -> Result<()> {
    let loader = StaticLoader::new(vocabulary())
        .with_classifier("linear_svc", Arc::new(Failing))
        .with_classifier("knn", Arc::new(Failing));
    let engine = EmotionEngine::load(EngineConfig::default(), &loader)?;

    let analysis = engine.analyze_text("I am so sad and lonely");
    let ensemble = analysis.ensemble.as_ref().expect("ensemble loaded");
    assert_eq!(ensemble.label, EmotionLabel::Neutral);
    assert_eq!(ensemble.confidence, 0.0);
    assert!(ensemble.is_degenerate());
    assert_eq!(analysis.rules.label, EmotionLabel::Sadness);
    Ok(())
}

#[test]
fn higher_weight_wins_disagreement() -> Result<()> {
    let loader = StaticLoader::new(vocabulary())
        .with_classifier(
            "linear_svc",
            Stub::probabilistic(LabelDistribution::one_hot(EmotionLabel::Joy)),
        )
        .with_classifier(
            "knn",
            Stub::probabilistic(LabelDistribution::one_hot(EmotionLabel::Anger)),
        );
    let engine = EmotionEngine::load(EngineConfig::default(), &loader)?;

    let comparisons = engine.compare_models("today");
    assert_eq!(comparisons.len(), 2);
    assert!(comparisons[0].agrees_with_ensemble);
    assert!(!comparisons[1].agrees_with_ensemble);
    assert_eq!(comparisons[0].weight, 0.25);
    assert_eq!(comparisons[1].weight, 0.05);
    Ok(())
}

#[test]
fn analysis_is_deterministic() -> Result<()> {
    let engine = all_joy_engine()?;
    let text = "Really happy, but somewhat worried about tomorrow!";
    assert_eq!(engine.analyze_text(text), engine.analyze_text(text));
    Ok(())
}
