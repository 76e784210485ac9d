//! Longitudinal statistics over stored analysis records.
//!
//! [`AnalyticsAggregator::summarize`] is a pure function of the records and
//! an explicit `now`; it never reads the system clock and never mutates its
//! input. Only the most recent [`AnalyticsConfig::max_records`] records at or
//! before `now` are scanned.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MoodlensError, Result};
use crate::label::{EmotionLabel, LabelCounts};

/// One stored analysis outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub timestamp: DateTime<Utc>,
    pub label: EmotionLabel,
    pub confidence: f64,
    /// Signed sentiment in [-1, 1]; derived from the label when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
}

impl AnalysisRecord {
    pub fn new(timestamp: DateTime<Utc>, label: EmotionLabel, confidence: f64) -> Self {
        Self {
            timestamp,
            label,
            confidence,
            sentiment: None,
        }
    }

    pub fn with_sentiment(mut self, sentiment: f64) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// Stored sentiment, or `polarity(label) × confidence`.
    pub fn signed_sentiment(&self) -> f64 {
        self.sentiment
            .unwrap_or_else(|| self.label.polarity() * self.confidence)
    }
}

/// Which per-record value the trend compares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    #[default]
    Confidence,
    Sentiment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient_data",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mood::Positive => "positive",
            Mood::Neutral => "neutral",
            Mood::Negative => "negative",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Upper bound on records scanned per summary.
    pub max_records: usize,
    /// Fewer records than this yield [`Trend::InsufficientData`].
    pub min_trend_records: usize,
    /// Differences within ±deadband count as no change.
    pub deadband: f64,
    /// Number of most recent records that make up the current mood.
    pub mood_window: usize,
    pub trend_metric: TrendMetric,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_records: 1000,
            min_trend_records: 10,
            deadband: 0.1,
            mood_window: 5,
            trend_metric: TrendMetric::Confidence,
        }
    }
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(MoodlensError::configuration(
                "analytics max_records must be at least 1",
            ));
        }
        if self.mood_window == 0 {
            return Err(MoodlensError::configuration(
                "analytics mood_window must be at least 1",
            ));
        }
        if !self.deadband.is_finite() || self.deadband < 0.0 {
            return Err(MoodlensError::configuration(format!(
                "analytics deadband must be non-negative, got {}",
                self.deadband
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Records actually scanned.
    pub total_records: usize,
    pub distribution: LabelCounts,
    /// Share of each label in percent.
    pub label_percentages: BTreeMap<EmotionLabel, f64>,
    /// Highest count; ties go to the label seen first.
    pub most_common: Option<EmotionLabel>,
    pub average_confidence: f64,
    pub average_sentiment: f64,
    pub trend: Trend,
    pub current_mood: Mood,
    /// Label of the latest record.
    pub recent_label: Option<EmotionLabel>,
    pub records_this_week: usize,
    pub records_this_month: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsAggregator {
    config: AnalyticsConfig,
}

impl AnalyticsAggregator {
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn summarize(&self, records: &[AnalysisRecord], now: DateTime<Utc>) -> AnalyticsSummary {
        let mut window: Vec<&AnalysisRecord> =
            records.iter().filter(|r| r.timestamp <= now).collect();
        window.sort_by_key(|r| r.timestamp);
        if window.len() > self.config.max_records {
            window.drain(..window.len() - self.config.max_records);
        }

        let total_records = window.len();
        let mut distribution = LabelCounts::new();
        for record in &window {
            distribution.increment(record.label);
        }

        let label_percentages = distribution
            .iter()
            .map(|(label, count)| {
                let pct = if total_records == 0 {
                    0.0
                } else {
                    count as f64 / total_records as f64 * 100.0
                };
                (label, pct)
            })
            .collect();

        let week_start = now - Duration::days(7);
        let month_start = now - Duration::days(30);

        AnalyticsSummary {
            total_records,
            distribution,
            label_percentages,
            most_common: distribution.most_common_by_first_seen(window.iter().map(|r| r.label)),
            average_confidence: mean(window.iter().map(|r| r.confidence)),
            average_sentiment: mean(window.iter().map(|r| r.signed_sentiment())),
            trend: self.trend(&window),
            current_mood: self.current_mood(&window),
            recent_label: window.last().map(|r| r.label),
            records_this_week: window.iter().filter(|r| r.timestamp >= week_start).count(),
            records_this_month: window.iter().filter(|r| r.timestamp >= month_start).count(),
        }
    }

    /// Compares the mean of the later half against the earlier half.
    fn trend(&self, window: &[&AnalysisRecord]) -> Trend {
        if window.len() < self.config.min_trend_records.max(2) {
            return Trend::InsufficientData;
        }
        let metric = |r: &&AnalysisRecord| match self.config.trend_metric {
            TrendMetric::Confidence => r.confidence,
            TrendMetric::Sentiment => r.signed_sentiment(),
        };
        let (first, second) = window.split_at(window.len() / 2);
        let delta = mean(second.iter().map(metric)) - mean(first.iter().map(metric));

        if delta > self.config.deadband {
            Trend::Improving
        } else if delta < -self.config.deadband {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    fn current_mood(&self, window: &[&AnalysisRecord]) -> Mood {
        let start = window.len().saturating_sub(self.config.mood_window);
        let recent = &window[start..];
        if recent.is_empty() {
            return Mood::Neutral;
        }
        let sentiment = mean(recent.iter().map(|r| r.signed_sentiment()));
        if sentiment > self.config.deadband {
            Mood::Positive
        } else if sentiment < -self.config.deadband {
            Mood::Negative
        } else {
            Mood::Neutral
        }
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}
