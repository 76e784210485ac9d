//! Keyword and context vocabularies of the rule-based adjuster.
//!
//! Terms are written the way the normalizer emits text: lowercase, with
//! hyphens removed ("mind-blowing" becomes "mindblowing").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MoodlensError, Result};
use crate::label::EmotionLabel;

/// How a term is looked up in normalized text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermMatch {
    /// Plain substring containment: "win" also matches "window".
    #[default]
    Substring,
    /// Whole words only; multi-word terms must match consecutive words.
    Word,
}

impl TermMatch {
    /// Non-overlapping occurrences of `term` in `text`.
    pub fn count(self, term: &str, text: &str, words: &[&str]) -> usize {
        if term.is_empty() {
            return 0;
        }
        match self {
            TermMatch::Substring => text.matches(term).count(),
            TermMatch::Word => {
                let parts: Vec<&str> = term.split_whitespace().collect();
                if parts.is_empty() || parts.len() > words.len() {
                    return 0;
                }
                words
                    .windows(parts.len())
                    .filter(|window| *window == parts.as_slice())
                    .count()
            }
        }
    }

    pub fn contains(self, term: &str, text: &str, words: &[&str]) -> bool {
        match self {
            TermMatch::Substring => !term.is_empty() && text.contains(term),
            TermMatch::Word => self.count(term, text, words) > 0,
        }
    }
}

/// All vocabularies and multipliers used by the default adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTables {
    pub keywords: BTreeMap<EmotionLabel, Vec<String>>,
    pub keyword_match: TermMatch,
    /// Intensifier to multiplier; above 1 amplifies, below 1 dampens.
    pub intensifiers: BTreeMap<String, f64>,
    pub intensifier_match: TermMatch,
    pub positive_context: Vec<String>,
    pub negative_context: Vec<String>,
    pub context_match: TermMatch,
    pub motivational_terms: Vec<String>,
    /// Total score at which rule confidence reaches 1.
    pub saturation: f64,
}

fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

const JOY: &[&str] = &[
    "happy", "joy", "excited", "thrilled", "delighted", "pleased", "ecstatic", "elated",
    "jubilant", "cheerful", "glad", "content", "motivated", "energized", "energetic", "pumped",
    "fired up", "enthusiastic", "passionate", "inspired", "determined", "confident",
    "optimistic", "positive", "amazing", "wonderful", "fantastic", "brilliant", "awesome",
    "great", "excellent", "outstanding", "conquer", "achieve", "succeed", "win", "victory",
    "triumph", "empowered", "strong", "powerful", "unstoppable", "invincible", "boss",
    "tackled", "momentum", "wave", "current", "spirit", "accomplished", "completed",
    "finished", "done", "checked", "progress", "advancement", "growth", "improvement",
    "development", "breakthrough", "milestone", "achievement", "success", "accomplishment",
    "fulfilled", "satisfied", "proud", "grateful", "blessed", "lucky", "fortunate",
    "appreciative", "thankful", "peaceful", "calm", "relaxed", "centered", "balanced",
    "focused", "driven", "ambitious", "goaloriented", "purposeful", "meaningful", "rewarding",
    "fulfilling", "satisfying", "enjoyable", "pleasurable", "delightful", "charming", "lovely",
    "beautiful", "perfect", "ideal", "dream", "wish", "hope", "aspire", "strive", "endeavor",
    "pursue", "chase", "follow", "seek",
];

const SADNESS: &[&str] = &[
    "sad", "depressed", "melancholy", "gloomy", "miserable", "sorrowful", "unhappy", "down",
    "blue", "dejected", "despondent", "heartbroken", "hopeless", "defeated", "discouraged",
    "disappointed", "let down", "lonely", "isolated", "abandoned", "rejected", "worthless",
];

const ANGER: &[&str] = &[
    "angry", "furious", "irritated", "annoyed", "mad", "rage", "livid", "enraged", "outraged",
    "fuming", "frustrated", "aggravated", "exasperated", "infuriated", "incensed", "hostile",
    "aggressive", "violent", "hate", "despise", "loathe",
];

const FEAR: &[&str] = &[
    "afraid", "scared", "terrified", "anxious", "worried", "fearful", "panicked", "horrified",
    "dread", "alarmed", "nervous", "tense", "stressed", "overwhelmed", "paranoid", "suspicious",
    "cautious", "hesitant", "uncertain", "doubtful", "insecure", "vulnerable",
];

const SURPRISE: &[&str] = &[
    "surprised", "shocked", "amazed", "astonished", "stunned", "bewildered", "dumbfounded",
    "flabbergasted", "startled", "unexpected", "unbelievable", "incredible", "mindblowing",
    "jawdropping", "staggering", "overwhelming", "unforeseen",
];

const LOVE: &[&str] = &[
    "love", "adore", "cherish", "fond", "affectionate", "tender", "passionate", "romantic",
    "devoted", "caring", "warm", "appreciate", "grateful", "thankful", "blessed", "lucky",
    "cherished", "valued", "respected", "admired", "beloved",
];

const POSITIVE_CONTEXT: &[&str] = &[
    "like", "love", "enjoy", "appreciate", "grateful", "thankful", "blessed", "lucky",
    "fortunate", "amazing", "wonderful", "fantastic", "great", "excellent", "awesome",
    "brilliant", "outstanding", "perfect", "ideal", "dream", "wish", "hope", "aspire",
    "achieve", "succeed", "win", "victory", "triumph", "conquer", "momentum", "wave", "current",
    "spirit", "energy", "power", "strength", "confidence", "determination", "passion",
    "inspiration", "motivation", "drive", "ambition", "purpose", "meaning", "fulfillment",
    "satisfaction", "contentment", "peace", "calm", "relaxed", "centered", "balanced",
    "focused", "clear", "bright", "light", "warm", "comfortable", "cozy", "safe", "secure",
    "protected", "supported", "encouraged", "inspired", "motivated", "energized", "pumped",
    "fired up", "ready", "prepared", "equipped", "capable", "able", "skilled", "talented",
    "gifted",
];

const NEGATIVE_CONTEXT: &[&str] = &[
    "hate", "despise", "loathe", "abhor", "detest", "disgust", "repulsed", "revolted",
    "sickened", "appalled", "horrified", "terrified", "scared", "afraid", "fearful", "anxious",
    "worried", "stressed", "overwhelmed", "depressed", "sad", "miserable", "hopeless",
    "helpless", "powerless", "weak", "defeated", "destroyed", "ruined", "broken", "damaged",
    "hurt", "pain", "suffering", "agony", "torture", "nightmare", "horror", "terror", "panic",
    "chaos", "disaster", "catastrophe", "tragedy", "loss", "grief", "sorrow", "despair",
    "desperation", "hopelessness", "worthlessness", "uselessness", "meaninglessness",
    "emptiness", "loneliness", "isolation", "abandonment", "rejection", "betrayal",
    "deception", "lies", "false", "fake", "phony", "fraud", "corruption", "evil", "wicked",
    "sinful", "guilty", "shame", "embarrassment", "humiliation", "disgrace", "dishonor",
    "disrespect",
];

const MOTIVATIONAL: &[&str] = &[
    "boss", "tackled", "momentum", "wave", "current", "spirit", "achieved", "completed",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("really", 1.5),
    ("extremely", 2.0),
    ("absolutely", 2.0),
    ("completely", 1.8),
    ("totally", 1.8),
    ("incredibly", 1.7),
    ("amazingly", 1.7),
    ("slightly", 0.5),
    ("somewhat", 0.7),
    ("kind of", 0.6),
    ("sort of", 0.6),
];

impl Default for RuleTables {
    fn default() -> Self {
        let keywords = [
            (EmotionLabel::Joy, JOY),
            (EmotionLabel::Sadness, SADNESS),
            (EmotionLabel::Anger, ANGER),
            (EmotionLabel::Fear, FEAR),
            (EmotionLabel::Surprise, SURPRISE),
            (EmotionLabel::Love, LOVE),
        ]
        .into_iter()
        .map(|(label, list)| (label, terms(list)))
        .collect();

        Self {
            keywords,
            keyword_match: TermMatch::Substring,
            intensifiers: INTENSIFIERS
                .iter()
                .map(|(term, m)| (term.to_string(), *m))
                .collect(),
            intensifier_match: TermMatch::Word,
            positive_context: terms(POSITIVE_CONTEXT),
            negative_context: terms(NEGATIVE_CONTEXT),
            context_match: TermMatch::Substring,
            motivational_terms: terms(MOTIVATIONAL),
            saturation: 10.0,
        }
    }
}

impl RuleTables {
    /// Keywords of one label; empty for labels without a list.
    pub fn keywords_for(&self, label: EmotionLabel) -> &[String] {
        self.keywords.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn validate(&self) -> Result<()> {
        if !self.saturation.is_finite() || self.saturation <= 0.0 {
            return Err(MoodlensError::configuration(format!(
                "rule saturation must be positive, got {}",
                self.saturation
            )));
        }
        if let Some((term, m)) = self
            .intensifiers
            .iter()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(MoodlensError::configuration(format!(
                "intensifier '{term}' has invalid multiplier {m}"
            )));
        }

        let all_terms = self
            .keywords
            .values()
            .flatten()
            .chain(self.intensifiers.keys())
            .chain(&self.positive_context)
            .chain(&self.negative_context)
            .chain(&self.motivational_terms);
        for term in all_terms {
            if term.trim().is_empty() {
                return Err(MoodlensError::configuration("rule terms must not be empty"));
            }
            if term.chars().any(char::is_uppercase) {
                return Err(MoodlensError::configuration(format!(
                    "rule term '{term}' must be lowercase to match normalized text"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_substring_count() {
        let text = "win the window";
        let words: Vec<&str> = text.split(' ').collect();
        assert_eq!(TermMatch::Substring.count("win", text, &words), 2);
        assert_eq!(TermMatch::Word.count("win", text, &words), 1);
    }

    #[test]
    fn test_word_phrases() {
        let text = "it was kind of sort of fine";
        let words: Vec<&str> = text.split(' ').collect();
        assert!(TermMatch::Word.contains("kind of", text, &words));
        assert!(!TermMatch::Word.contains("of fine today", text, &words));
        assert!(!TermMatch::Word.contains("very", "everything", &["everything"]));
    }

    #[test]
    fn test_default_tables_have_no_duplicates() {
        let tables = RuleTables::default();
        tables.validate().unwrap();
        for (label, words) in &tables.keywords {
            let unique: HashSet<_> = words.iter().collect();
            assert_eq!(unique.len(), words.len(), "duplicate keyword for {label}");
        }
        assert!(tables.keywords_for(EmotionLabel::Neutral).is_empty());
        assert_eq!(tables.intensifiers["extremely"], 2.0);
    }

    #[test]
    fn test_validation() {
        let mut tables = RuleTables::default();
        tables.saturation = 0.0;
        assert!(tables.validate().is_err());

        let mut tables = RuleTables::default();
        tables.motivational_terms.push("Boss".to_string());
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tables: RuleTables =
            serde_json::from_str(r#"{"keywords": {"joy": ["yay"]}, "saturation": 5.0}"#).unwrap();
        assert_eq!(tables.keywords_for(EmotionLabel::Joy), &["yay".to_string()]);
        assert_eq!(tables.intensifier_match, TermMatch::Word);
        assert_eq!(tables.saturation, 5.0);
    }
}
