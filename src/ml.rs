//! Statistical side of the engine: vectorization, pre-trained classifiers
//! and their weighted combination.
//!
//! ```text
//! normalized text → FeatureVectorizer → FeatureVector
//!                 → ClassifierBank (one PredictionResult per classifier)
//!                 → WeightedEnsembleAggregator → EnsembleResult
//! ```
//!
//! Everything here is built once from a [`crate::loader::ClassifierLoader`]
//! and is read-only afterwards.

pub mod bank;
pub mod classifier;
pub mod ensemble;
pub mod models;
pub mod vectorizer;

pub use bank::{BankConfig, ClassifierBank, PredictionResult};
pub use classifier::{Capability, ClassifierHandle, EmotionClassifier, LoadedClassifier};
pub use ensemble::{
    ConfidenceAnalysis, EnsembleResult, ModelComparison, WeightedEnsembleAggregator,
    recommend_classifier,
};
pub use models::{
    DecisionTreeModel, GradientBoostingModel, KnnModel, LinearModel, ModelSpec, NaiveBayesModel,
    RandomForestModel,
};
pub use vectorizer::{FeatureVector, FeatureVectorizer, Norm, TermSplit, VocabularyTable};
