//! The emotion engine: one entry point over normalization, the classifier
//! ensemble, the rule-based adjuster and analytics.
//!
//! An engine is built once and is read-only afterwards, so a single
//! instance can serve any number of threads.
//!
//! # Examples
//!
//! ```
//! use moodlens::engine::EmotionEngine;
//! use moodlens::label::EmotionLabel;
//!
//! // No classifiers: only the rule-based path is available.
//! let engine = EmotionEngine::builder().build().unwrap();
//! let analysis = engine.analyze_text("I'm so happy and grateful today!");
//!
//! assert!(analysis.ensemble.is_none());
//! assert_eq!(analysis.rules.label, EmotionLabel::Joy);
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::analysis::{TextFeatures, TextNormalizer};
use crate::analytics::{AnalysisRecord, AnalyticsAggregator, AnalyticsSummary};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::label::EmotionLabel;
use crate::loader::{ClassifierLoader, LoadedModels};
use crate::ml::{
    BankConfig, Capability, ClassifierBank, ConfidenceAnalysis, EnsembleResult, FeatureVectorizer,
    ModelComparison, WeightedEnsembleAggregator, recommend_classifier,
};
use crate::rules::{
    Adjustment, ContextRuleAdjuster, DEFAULT_CONTRADICTION_THRESHOLD, RuleScores,
    detect_contradictions,
};
use crate::store::{Clock, RecordStore};

/// Everything the engine knows about one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    pub text: String,
    pub normalized: String,
    pub features: TextFeatures,
    /// Keyword-based scores; always present.
    pub rules: RuleScores,
    /// Conflicting label pairs in the rule distribution.
    pub contradictions: Vec<(EmotionLabel, EmotionLabel)>,
    /// Classifier ensemble output, when classifiers are loaded.
    pub ensemble: Option<EnsembleResult>,
    /// Classifier family suited to the length of this text.
    pub recommended_classifier: String,
}

impl EmotionAnalysis {
    /// The ensemble label when available, otherwise the rule-based one.
    pub fn label(&self) -> EmotionLabel {
        self.ensemble
            .as_ref()
            .map(|e| e.label)
            .unwrap_or(self.rules.label)
    }

    /// Confidence paired with [`label`](Self::label).
    pub fn confidence(&self) -> f64 {
        self.ensemble
            .as_ref()
            .map(|e| e.confidence)
            .unwrap_or(self.rules.confidence)
    }

    pub fn to_record(&self, timestamp: DateTime<Utc>) -> AnalysisRecord {
        AnalysisRecord::new(timestamp, self.label(), self.confidence())
    }
}

/// Vectorizer, classifiers and aggregator, built together from one load.
#[derive(Debug, Clone)]
pub struct EnsembleModel {
    vectorizer: FeatureVectorizer,
    bank: ClassifierBank,
    aggregator: WeightedEnsembleAggregator,
}

impl EnsembleModel {
    pub fn new(config: &BankConfig, models: LoadedModels) -> Result<Self> {
        let vectorizer = FeatureVectorizer::new(models.vocabulary)?;
        let bank = ClassifierBank::new(config, models.classifiers)?;
        Ok(Self {
            vectorizer,
            bank,
            aggregator: WeightedEnsembleAggregator::new(),
        })
    }

    pub fn bank(&self) -> &ClassifierBank {
        &self.bank
    }

    pub fn vectorizer(&self) -> &FeatureVectorizer {
        &self.vectorizer
    }

    /// Run every classifier on already-normalized text.
    pub fn analyze(&self, normalized: &str) -> EnsembleResult {
        if normalized.is_empty() {
            return EnsembleResult::neutral(Vec::new());
        }
        match self.vectorizer.vectorize(normalized) {
            Ok(features) => self.aggregator.aggregate(self.bank.predict_all(&features)),
            Err(e) => {
                error!(error = %e, "Vectorization failed, returning neutral ensemble result");
                EnsembleResult::neutral(Vec::new())
            }
        }
    }
}

/// A classifier's name, weight and capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierInfo {
    pub name: String,
    pub weight: f64,
    pub capability: Capability,
}

#[derive(Debug, Clone)]
pub struct EmotionEngine {
    normalizer: TextNormalizer,
    ensemble: Option<EnsembleModel>,
    rules: ContextRuleAdjuster,
    analytics: AnalyticsAggregator,
}

impl EmotionEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Build an engine from `config` and whatever `loader` supplies.
    ///
    /// A loader failure is logged and leaves the engine on the rule-based
    /// path. An invalid `config` is an error.
    pub fn load(config: EngineConfig, loader: &dyn ClassifierLoader) -> Result<Self> {
        config.validate()?;
        let mut engine = EngineBuilder::new().config(config.clone()).build()?;

        match loader
            .load()
            .and_then(|models| EnsembleModel::new(&config.bank, models))
        {
            Ok(ensemble) => {
                info!(
                    classifiers = ensemble.bank.len(),
                    dimension = ensemble.vectorizer.dimension(),
                    "Classifier ensemble ready"
                );
                engine.ensemble = Some(ensemble);
            }
            Err(e) => {
                error!(error = %e, "Failed to load classifiers");
                warn!("Continuing with rule-based analysis only");
            }
        }
        Ok(engine)
    }

    pub fn has_ensemble(&self) -> bool {
        self.ensemble.is_some()
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn rules(&self) -> &ContextRuleAdjuster {
        &self.rules
    }

    /// Full analysis of one text. Never fails.
    pub fn analyze_text(&self, text: &str) -> EmotionAnalysis {
        let normalized = self.normalizer.normalize(text);
        let rules = self.rules.score(&normalized);
        let contradictions =
            detect_contradictions(&rules.distribution(), DEFAULT_CONTRADICTION_THRESHOLD);
        let ensemble = self.ensemble.as_ref().map(|e| e.analyze(&normalized));

        debug!(
            rule_label = %rules.label,
            ensemble_label = ?ensemble.as_ref().map(|e| e.label),
            "Analyzed text"
        );

        EmotionAnalysis {
            features: TextFeatures::extract(text),
            recommended_classifier: recommend_classifier(text).to_string(),
            text: text.to_string(),
            normalized,
            rules,
            contradictions,
            ensemble,
        }
    }

    /// Ensemble output only; neutral with zero confidence when no
    /// classifiers are loaded.
    pub fn analyze_ensemble(&self, text: &str) -> EnsembleResult {
        match &self.ensemble {
            Some(ensemble) => ensemble.analyze(&self.normalizer.normalize(text)),
            None => EnsembleResult::neutral(Vec::new()),
        }
    }

    /// Rule-based scores only.
    pub fn analyze_rules(&self, text: &str) -> RuleScores {
        self.rules.score(&self.normalizer.normalize(text))
    }

    /// Analyze many texts in parallel, preserving order.
    pub fn analyze_batch<S>(&self, texts: &[S]) -> Vec<EmotionAnalysis>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.analyze_text(text.as_ref()))
            .collect()
    }

    /// Each classifier's prediction next to the ensemble decision.
    pub fn compare_models(&self, text: &str) -> Vec<ModelComparison> {
        ModelComparison::from_result(&self.analyze_ensemble(text))
    }

    pub fn confidence_analysis(&self, text: &str) -> ConfidenceAnalysis {
        ConfidenceAnalysis::from_result(&self.analyze_ensemble(text))
    }

    /// Classifier names in load order; empty without an ensemble.
    pub fn list_classifiers(&self) -> Vec<String> {
        self.ensemble
            .as_ref()
            .map(|e| e.bank.list_classifiers())
            .unwrap_or_default()
    }

    pub fn classifier_info(&self) -> Vec<ClassifierInfo> {
        self.ensemble
            .as_ref()
            .map(|e| {
                e.bank
                    .handles()
                    .iter()
                    .map(|h| ClassifierInfo {
                        name: h.name().to_string(),
                        weight: h.weight(),
                        capability: h.capability(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn summarize(&self, records: &[AnalysisRecord], now: DateTime<Utc>) -> AnalyticsSummary {
        self.analytics.summarize(records, now)
    }

    pub fn summarize_with_clock(
        &self,
        records: &[AnalysisRecord],
        clock: &dyn Clock,
    ) -> AnalyticsSummary {
        self.analytics.summarize(records, clock.now())
    }

    /// Analyze `text` and append its record to `store`.
    pub fn analyze_and_store(
        &self,
        text: &str,
        store: &dyn RecordStore,
        clock: &dyn Clock,
    ) -> Result<EmotionAnalysis> {
        let analysis = self.analyze_text(text);
        let id = store.append(analysis.to_record(clock.now()))?;
        debug!(record = %id, label = %analysis.label(), "Stored analysis record");
        Ok(analysis)
    }

    /// Summarize the most recent records held by `store`.
    pub fn summarize_store(
        &self,
        store: &dyn RecordStore,
        clock: &dyn Clock,
    ) -> Result<AnalyticsSummary> {
        let records = store.recent(self.analytics.config().max_records)?;
        Ok(self.analytics.summarize(&records, clock.now()))
    }
}

/// Builder for [`EmotionEngine`].
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    models: Option<LoadedModels>,
    adjustments: Vec<Arc<dyn Adjustment>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Classifiers and vocabulary for the ensemble path.
    pub fn models(mut self, models: LoadedModels) -> Self {
        self.models = Some(models);
        self
    }

    /// Append a rule adjustment after the default ones.
    pub fn adjustment(mut self, adjustment: Arc<dyn Adjustment>) -> Self {
        self.adjustments.push(adjustment);
        self
    }

    /// Build the engine. Unlike [`EmotionEngine::load`], invalid models are
    /// an error here.
    pub fn build(self) -> Result<EmotionEngine> {
        self.config.validate()?;

        let normalizer = TextNormalizer::new(&self.config.normalizer)?;
        let mut rules = ContextRuleAdjuster::new(self.config.rules)?;
        for adjustment in self.adjustments {
            rules = rules.with_adjustment(adjustment);
        }
        let analytics = AnalyticsAggregator::new(self.config.analytics)?;
        let ensemble = self
            .models
            .map(|models| EnsembleModel::new(&self.config.bank, models))
            .transpose()?;

        Ok(EmotionEngine {
            normalizer,
            ensemble,
            rules,
            analytics,
        })
    }
}
