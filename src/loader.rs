//! One-time loading of the vocabulary and the pre-trained classifiers.
//!
//! A model directory holds a `manifest.json`:
//!
//! ```json
//! {
//!   "vocabulary": "vocabulary.json",
//!   "classifiers": [
//!     { "name": "linear_svc", "file": "linear_svc.json", "weight": 0.25 },
//!     { "name": "naive_bayes", "file": "naive_bayes.json" }
//!   ]
//! }
//! ```
//!
//! The vocabulary file is a serialized [`VocabularyTable`]; every classifier
//! file is a tagged [`ModelSpec`]. Classifiers without a `weight` take the
//! one from the bank configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MoodlensError, Result};
use crate::ml::{EmotionClassifier, LoadedClassifier, ModelSpec, VocabularyTable};

/// File name of the manifest inside a model directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Everything the statistical path needs, as produced by a loader.
#[derive(Clone)]
pub struct LoadedModels {
    pub vocabulary: VocabularyTable,
    pub classifiers: Vec<LoadedClassifier>,
}

impl std::fmt::Debug for LoadedModels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModels")
            .field("vocabulary_size", &self.vocabulary.dimension())
            .field("classifiers", &self.classifiers)
            .finish()
    }
}

/// Supplies the vocabulary and classifiers at startup.
pub trait ClassifierLoader: Send + Sync {
    fn load(&self) -> Result<LoadedModels>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub vocabulary: PathBuf,
    pub classifiers: Vec<ManifestEntry>,
}

/// Loads a model directory described by [`MANIFEST_FILE`].
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> Result<Manifest> {
        read_json(&self.root.join(MANIFEST_FILE))
    }
}

impl ClassifierLoader for DirectoryLoader {
    fn load(&self) -> Result<LoadedModels> {
        let manifest = self.manifest()?;
        if manifest.classifiers.is_empty() {
            return Err(MoodlensError::configuration(format!(
                "{} lists no classifiers",
                self.root.join(MANIFEST_FILE).display()
            )));
        }

        let vocabulary_path = self.root.join(&manifest.vocabulary);
        let vocabulary: VocabularyTable = read_json(&vocabulary_path)?;
        vocabulary.validate().map_err(|e| {
            MoodlensError::configuration(format!("{}: {e}", vocabulary_path.display()))
        })?;
        let dimension = vocabulary.dimension();
        debug!(path = %vocabulary_path.display(), dimension, "Loaded vocabulary");

        let mut classifiers = Vec::with_capacity(manifest.classifiers.len());
        for entry in manifest.classifiers {
            let path = self.root.join(&entry.file);
            let spec: ModelSpec = read_json(&path)?;
            let kind = spec.kind();
            let classifier = spec
                .into_classifier(dimension)
                .map_err(|e| MoodlensError::configuration(format!("{}: {e}", path.display())))?;
            debug!(classifier = %entry.name, kind, "Loaded classifier");

            let mut loaded = LoadedClassifier::new(entry.name, classifier);
            loaded.weight = entry.weight;
            classifiers.push(loaded);
        }

        info!(
            root = %self.root.display(),
            classifiers = classifiers.len(),
            dimension,
            "Loaded model directory"
        );
        Ok(LoadedModels {
            vocabulary,
            classifiers,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MoodlensError::configuration(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| MoodlensError::configuration(format!("malformed {}: {e}", path.display())))
}

/// In-memory loader over already-built classifiers.
#[derive(Debug, Clone)]
pub struct StaticLoader {
    models: LoadedModels,
}

impl StaticLoader {
    pub fn new(vocabulary: VocabularyTable) -> Self {
        Self {
            models: LoadedModels {
                vocabulary,
                classifiers: Vec::new(),
            },
        }
    }

    /// Add a classifier that takes its weight from the bank configuration.
    pub fn with_classifier<S: Into<String>>(
        mut self,
        name: S,
        classifier: Arc<dyn EmotionClassifier>,
    ) -> Self {
        self.models
            .classifiers
            .push(LoadedClassifier::new(name, classifier));
        self
    }

    /// Add a classifier with an explicit weight.
    pub fn with_weighted_classifier<S: Into<String>>(
        mut self,
        name: S,
        classifier: Arc<dyn EmotionClassifier>,
        weight: f64,
    ) -> Self {
        self.models
            .classifiers
            .push(LoadedClassifier::new(name, classifier).with_weight(weight));
        self
    }

    /// Add a classifier from a tagged model description.
    pub fn with_model<S: Into<String>>(self, name: S, spec: ModelSpec) -> Result<Self> {
        let classifier = spec.into_classifier(self.models.vocabulary.dimension())?;
        Ok(self.with_classifier(name, classifier))
    }
}

impl ClassifierLoader for StaticLoader {
    fn load(&self) -> Result<LoadedModels> {
        self.models.vocabulary.validate()?;
        Ok(self.models.clone())
    }
}
