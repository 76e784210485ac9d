//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::Serialize;

use crate::analytics::AnalyticsSummary;
use crate::cli::args::{MoodlensArgs, OutputFormat};
use crate::engine::{ClassifierInfo, EmotionAnalysis};
use crate::error::Result;
use crate::label::LabelDistribution;
use crate::rules::RuleScores;

/// Plain-text rendering of a command result.
pub trait HumanOutput {
    fn render_human(&self) -> String;
}

/// Output a result in the selected format.
pub fn output_result<T>(message: &str, result: &T, args: &MoodlensArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            print!("{}", result.render_human());
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", render_json(result, args.pretty)?);
            Ok(())
        }
    }
}

pub fn render_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    })
}

/// Labels with a non-zero value, highest first.
fn ranked(dist: &LabelDistribution) -> String {
    let mut entries: Vec<_> = dist.iter().filter(|(_, v)| *v > 0.0).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries
        .iter()
        .map(|(label, v)| format!("{label}={v:.3}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl HumanOutput for RuleScores {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Rules: {} (confidence {:.2}, total {:.2})",
            self.label, self.confidence, self.total
        );
        if !self.matched_keywords.is_empty() {
            let _ = writeln!(out, "  Keywords:");
            for (label, words) in &self.matched_keywords {
                let _ = writeln!(
                    out,
                    "    {label}: {} -> {:.2}",
                    words.join(", "),
                    self.scores.get(*label)
                );
            }
        }
        if !self.applied.is_empty() {
            let _ = writeln!(out, "  Adjustments: {}", self.applied.join(", "));
        }
        out
    }
}

impl HumanOutput for EmotionAnalysis {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Text: {}", self.text);
        let _ = writeln!(out, "Normalized: {}", self.normalized);
        let _ = writeln!(out, "Emotion: {} ({:.2})", self.label(), self.confidence());

        match &self.ensemble {
            Some(ensemble) => {
                let _ = writeln!(
                    out,
                    "Ensemble: {} (confidence {:.2}, agreement {:.2}, {} classifiers)",
                    ensemble.label,
                    ensemble.confidence,
                    ensemble.agreement,
                    ensemble.models_used.len()
                );
                let _ = writeln!(out, "  Distribution: {}", ranked(&ensemble.distribution));
                for prediction in &ensemble.predictions {
                    let status = if prediction.failed { " [failed]" } else { "" };
                    let _ = writeln!(
                        out,
                        "    {:<20} {:<9} {:.2} (weight {:.2}){status}",
                        prediction.classifier,
                        prediction.label.as_str(),
                        prediction.confidence,
                        prediction.weight
                    );
                }
            }
            None => {
                let _ = writeln!(out, "Ensemble: unavailable");
            }
        }

        out.push_str(&self.rules.render_human());
        if !self.contradictions.is_empty() {
            let pairs: Vec<_> = self
                .contradictions
                .iter()
                .map(|(a, b)| format!("{a}/{b}"))
                .collect();
            let _ = writeln!(out, "Mixed signals: {}", pairs.join(", "));
        }
        let _ = writeln!(
            out,
            "Words: {}, sentences: {}, lexical diversity: {:.2}",
            self.features.word_count, self.features.sentence_count, self.features.lexical_diversity
        );
        out
    }
}

impl HumanOutput for Vec<ClassifierInfo> {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<24} {:>6}  Capability", "Classifier", "Weight");
        for info in self {
            let _ = writeln!(
                out,
                "{:<24} {:>6.2}  {}",
                info.name, info.weight, info.capability
            );
        }
        out
    }
}

impl HumanOutput for AnalyticsSummary {
    fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Records: {}", self.total_records);
        let _ = writeln!(
            out,
            "  This week: {}, this month: {}",
            self.records_this_week, self.records_this_month
        );
        if let Some(label) = self.most_common {
            let _ = writeln!(out, "Most common: {label}");
        }
        if let Some(label) = self.recent_label {
            let _ = writeln!(out, "Most recent: {label}");
        }
        let _ = writeln!(out, "Average confidence: {:.2}", self.average_confidence);
        let _ = writeln!(out, "Average sentiment: {:+.2}", self.average_sentiment);
        let _ = writeln!(out, "Trend: {}", self.trend);
        let _ = writeln!(out, "Current mood: {}", self.current_mood);
        for (label, count) in self.distribution.iter().filter(|(_, c)| *c > 0) {
            let pct = self.label_percentages.get(&label).copied().unwrap_or(0.0);
            let _ = writeln!(out, "  {label:<9} {count:>5}  {pct:5.1}%");
        }
        out
    }
}
