//! Engine configuration.
//!
//! Every section has a `Default` and missing JSON fields fall back to it, so
//! a config file only needs to name what it changes:
//!
//! ```json
//! {
//!   "bank": { "weights": { "linear_svc": 0.3 }, "parallel": false },
//!   "analytics": { "trend_metric": "sentiment" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::NormalizerConfig;
use crate::analytics::AnalyticsConfig;
use crate::error::{MoodlensError, Result};
use crate::ml::BankConfig;
use crate::rules::RuleTables;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub normalizer: NormalizerConfig,
    pub bank: BankConfig,
    pub rules: RuleTables,
    pub analytics: AnalyticsConfig,
}

impl EngineConfig {
    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MoodlensError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&content)
            .map_err(|e| MoodlensError::configuration(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bank.validate()?;
        self.rules.validate()?;
        self.analytics.validate()
    }
}
