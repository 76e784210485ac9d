use std::sync::Arc;

use proptest::prelude::*;

use moodlens::analysis::TextNormalizer;
use moodlens::config::EngineConfig;
use moodlens::engine::EmotionEngine;
use moodlens::error::Result;
use moodlens::label::{EmotionLabel, LabelDistribution};
use moodlens::loader::StaticLoader;
use moodlens::ml::{
    Capability, EmotionClassifier, FeatureVector, LinearModel, ModelSpec, PredictionResult,
    VocabularyTable, WeightedEnsembleAggregator,
};
use moodlens::rules::ContextRuleAdjuster;

const TERMS: [&str; 6] = ["happy", "sad", "angry", "scared", "love", "wow"];

/// Reads one label per vocabulary term straight off the feature vector.
struct TermCounter;

impl EmotionClassifier for TermCounter {
    fn predict(&self, features: &FeatureVector) -> Result<EmotionLabel> {
        Ok(self.distribution(features).argmax())
    }

    fn predict_distribution(&self, features: &FeatureVector) -> Result<Option<LabelDistribution>> {
        Ok(Some(self.distribution(features)))
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn name(&self) -> &str {
        "term_counter"
    }
}

impl TermCounter {
    fn distribution(&self, features: &FeatureVector) -> LabelDistribution {
        let labels = [
            EmotionLabel::Joy,
            EmotionLabel::Sadness,
            EmotionLabel::Anger,
            EmotionLabel::Fear,
            EmotionLabel::Love,
            EmotionLabel::Surprise,
        ];
        let mut dist = LabelDistribution::one_hot(EmotionLabel::Neutral);
        for (label, value) in labels.iter().zip(features.as_slice()) {
            dist.set(*label, *value);
        }
        dist
    }
}

fn engine() -> EmotionEngine {
    let dimension = TERMS.len();
    let coef = (0..3)
        .map(|row| (0..dimension).map(|col| ((row * 7 + col * 3) % 5) as f64 - 2.0).collect())
        .collect();
    let linear = LinearModel::new(
        vec![EmotionLabel::Joy, EmotionLabel::Sadness, EmotionLabel::Fear],
        coef,
        vec![0.1, 0.0, -0.1],
    );

    let loader = StaticLoader::new(VocabularyTable::from_terms(TERMS))
        .with_classifier("knn", Arc::new(TermCounter))
        .with_model("linear_svc", ModelSpec::LinearSvc(linear.clone()))
        .unwrap()
        .with_model("logistic_regression", ModelSpec::LogisticRegression(linear))
        .unwrap();
    EmotionEngine::load(EngineConfig::default(), &loader).unwrap()
}

fn text_strategy() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("happy".to_string()),
        Just("sad".to_string()),
        Just("angry".to_string()),
        Just("scared".to_string()),
        Just("love".to_string()),
        Just("wow".to_string()),
        Just("very".to_string()),
        Just("tackled".to_string()),
        "[a-zA-Z']{1,8}",
        "[!?.,]{1,3}",
    ];
    prop::collection::vec(word, 0..12).prop_map(|words| words.join(" "))
}

fn distribution_strategy() -> impl Strategy<Value = LabelDistribution> {
    prop::array::uniform7(0.0f64..1.0).prop_map(|values| {
        let dist = LabelDistribution::from_values(values);
        if dist.sum() > 0.0 {
            dist.normalized()
        } else {
            LabelDistribution::one_hot(EmotionLabel::Neutral)
        }
    })
}

fn prediction(name: &str, distribution: LabelDistribution, weight: f64) -> PredictionResult {
    let label = distribution.argmax();
    PredictionResult {
        classifier: name.to_string(),
        label,
        confidence: distribution.get(label),
        distribution,
        weight,
        capability: Capability::Probabilistic,
        failed: false,
    }
}

proptest! {
    #[test]
    fn ensemble_scores_are_well_formed(text in text_strategy()) {
        let engine = engine();
        let result = engine.analyze_ensemble(&text);

        prop_assert!((0.0..=1.0).contains(&result.confidence));
        prop_assert!((0.0..=1.0).contains(&result.agreement));
        if !result.models_used.is_empty() {
            prop_assert!((result.distribution.sum() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn analysis_is_deterministic(text in text_strategy()) {
        let engine = engine();
        prop_assert_eq!(engine.analyze_text(&text), engine.analyze_text(&text));
    }

    #[test]
    fn rule_confidence_is_bounded(text in text_strategy()) {
        let normalized = TextNormalizer::default().normalize(&text);
        let scores = ContextRuleAdjuster::default().score(&normalized);
        prop_assert!((0.0..=1.0).contains(&scores.confidence));
        prop_assert!(scores.scores.values().iter().all(|v| *v >= 0.0));
        if scores.total == 0.0 {
            prop_assert_eq!(scores.label, EmotionLabel::Neutral);
        }
    }

    #[test]
    fn normalization_is_idempotent(text in "[a-zA-Z0-9 '’!?.,@:/éÜ-]{0,40}") {
        let normalizer = TextNormalizer::default();
        let once = normalizer.normalize(&text);
        prop_assert_eq!(normalizer.normalize(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
    }

    #[test]
    fn raising_a_weight_never_lowers_its_influence(
        own in distribution_strategy(),
        other in distribution_strategy(),
        low in 0.01f64..0.5,
        extra in 0.0f64..0.5,
        other_weight in 0.01f64..1.0,
    ) {
        let aggregator = WeightedEnsembleAggregator::new();
        let before = aggregator.aggregate(vec![
            prediction("a", own, low),
            prediction("b", other, other_weight),
        ]);
        let after = aggregator.aggregate(vec![
            prediction("a", own, low + extra),
            prediction("b", other, other_weight),
        ]);

        // The combined distribution moves toward `own` on every label.
        for label in EmotionLabel::ALL {
            let gap_before = (before.distribution.get(label) - own.get(label)).abs();
            let gap_after = (after.distribution.get(label) - own.get(label)).abs();
            prop_assert!(gap_after <= gap_before + 1e-12);
        }
    }

    #[test]
    fn single_contributor_distribution_is_its_own(
        own in distribution_strategy(),
        other in distribution_strategy(),
        weight in 0.01f64..1.0,
    ) {
        let result = WeightedEnsembleAggregator::new().aggregate(vec![
            prediction("a", own, weight),
            prediction("b", other, 0.0),
        ]);
        prop_assert_eq!(result.distribution, own);
    }
}
