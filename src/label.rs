//! The closed emotion taxonomy and fixed-size per-label containers.
//!
//! Every component speaks in terms of [`EmotionLabel`]; nothing outside the
//! seven labels can be produced or consumed. The declaration order of the
//! enum is the canonical order used to break ties deterministically.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MoodlensError;

/// Number of labels in the taxonomy.
pub const LABEL_COUNT: usize = 7;

/// One of the seven emotion categories.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Anger,
    Fear,
    Joy,
    Love,
    #[default]
    Neutral,
    Sadness,
    Surprise,
}

impl EmotionLabel {
    /// All labels in canonical order.
    pub const ALL: [EmotionLabel; LABEL_COUNT] = [
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Joy,
        EmotionLabel::Love,
        EmotionLabel::Neutral,
        EmotionLabel::Sadness,
        EmotionLabel::Surprise,
    ];

    /// Canonical index of this label.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label at the given canonical index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Joy => "joy",
            EmotionLabel::Love => "love",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Surprise => "surprise",
        }
    }

    /// Sign of the label's valence: +1 for joy and love, -1 for anger, fear
    /// and sadness, 0 for neutral and surprise.
    pub fn polarity(self) -> f64 {
        match self {
            EmotionLabel::Joy | EmotionLabel::Love => 1.0,
            EmotionLabel::Anger | EmotionLabel::Fear | EmotionLabel::Sadness => -1.0,
            EmotionLabel::Neutral | EmotionLabel::Surprise => 0.0,
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = MoodlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        EmotionLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == lowered)
            .ok_or_else(|| MoodlensError::invalid_argument(format!("unknown emotion label '{s}'")))
    }
}

/// A real value for every label, indexed canonically.
///
/// Used both for probability distributions (which sum to 1 when populated)
/// and for unnormalized per-label scores.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabelDistribution {
    values: [f64; LABEL_COUNT],
}

impl LabelDistribution {
    /// All-zero distribution.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Distribution with all mass on one label.
    pub fn one_hot(label: EmotionLabel) -> Self {
        let mut dist = Self::zero();
        dist.set(label, 1.0);
        dist
    }

    pub fn from_values(values: [f64; LABEL_COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, label: EmotionLabel) -> f64 {
        self.values[label.index()]
    }

    pub fn set(&mut self, label: EmotionLabel, value: f64) {
        self.values[label.index()] = value;
    }

    pub fn add(&mut self, label: EmotionLabel, value: f64) {
        self.values[label.index()] += value;
    }

    /// Multiply the value of one label in place.
    pub fn scale(&mut self, label: EmotionLabel, factor: f64) {
        self.values[label.index()] *= factor;
    }

    pub fn values(&self) -> &[f64; LABEL_COUNT] {
        &self.values
    }

    /// Iterate `(label, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
        EmotionLabel::ALL.iter().map(|&label| (label, self.get(label)))
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Label with the highest value. Ties go to the label that comes first
    /// in canonical order.
    pub fn argmax(&self) -> EmotionLabel {
        let mut best = 0;
        for index in 1..LABEL_COUNT {
            if self.values[index] > self.values[best] {
                best = index;
            }
        }
        EmotionLabel::ALL[best]
    }

    /// Copy scaled so that the values sum to 1. A zero or non-finite sum
    /// yields the zero distribution.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total > 0.0 && total.is_finite() {
            let mut values = self.values;
            for value in &mut values {
                *value /= total;
            }
            Self { values }
        } else {
            Self::zero()
        }
    }

    /// Label → value map, convenient for display.
    pub fn to_map(&self) -> BTreeMap<EmotionLabel, f64> {
        self.iter().collect()
    }
}

impl Serialize for LabelDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LabelDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<EmotionLabel, f64>::deserialize(deserializer)?;
        let mut dist = LabelDistribution::zero();
        for (label, value) in map {
            dist.set(label, value);
        }
        Ok(dist)
    }
}

/// An integer count for every label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelCounts {
    counts: [usize; LABEL_COUNT],
}

impl LabelCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: EmotionLabel) -> usize {
        self.counts[label.index()]
    }

    pub fn increment(&mut self, label: EmotionLabel) {
        self.counts[label.index()] += 1;
    }

    pub fn add(&mut self, label: EmotionLabel, amount: usize) {
        self.counts[label.index()] += amount;
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, usize)> + '_ {
        EmotionLabel::ALL.iter().map(|&label| (label, self.get(label)))
    }

    /// Convert to a real-valued distribution of the same counts.
    pub fn as_distribution(&self) -> LabelDistribution {
        let mut dist = LabelDistribution::zero();
        for (label, count) in self.iter() {
            dist.set(label, count as f64);
        }
        dist
    }

    pub fn to_map(&self) -> BTreeMap<EmotionLabel, usize> {
        self.iter().collect()
    }

    /// Label with the highest count. Among tied labels, the one that comes
    /// first in `seen` wins. `None` when nothing was counted.
    pub fn most_common_by_first_seen<I>(&self, seen: I) -> Option<EmotionLabel>
    where
        I: IntoIterator<Item = EmotionLabel>,
    {
        let mut best: Option<(EmotionLabel, usize)> = None;
        for label in seen {
            let count = self.get(label);
            if count > 0 && best.is_none_or(|(_, top)| count > top) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }
}

impl Serialize for LabelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LabelCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<EmotionLabel, usize>::deserialize(deserializer)?;
        let mut counts = LabelCounts::new();
        for (label, count) in map {
            counts.add(label, count);
        }
        Ok(counts)
    }
}
