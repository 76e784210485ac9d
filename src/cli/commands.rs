//! Command implementations for the moodlens CLI.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::analytics::AnalysisRecord;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::engine::EmotionEngine;
use crate::error::{MoodlensError, Result};
use crate::loader::{ClassifierLoader, DirectoryLoader};
use crate::store::{Clock, SystemClock};

/// Execute a CLI command.
pub fn execute_command(args: MoodlensArgs) -> Result<()> {
    match &args.command {
        Command::Analyze(analyze_args) => analyze(analyze_args, &args),
        Command::Rules(rules_args) => score_rules(rules_args, &args),
        Command::Classifiers(classifiers_args) => list_classifiers(classifiers_args, &args),
        Command::Summarize(summarize_args) => summarize(summarize_args, &args),
    }
}

/// Full analysis of one text.
fn analyze(args: &AnalyzeArgs, cli_args: &MoodlensArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine = match &args.models {
        Some(dir) => EmotionEngine::load(config, &DirectoryLoader::new(dir))?,
        None => {
            info!("No model directory given, using rule-based analysis only");
            EmotionEngine::builder().config(config).build()?
        }
    };

    let text = read_text(&args.text)?;
    let analysis = engine.analyze_text(&text);
    output_result("Emotion analysis", &analysis, cli_args)
}

/// Rule-based scores only.
fn score_rules(args: &RulesArgs, cli_args: &MoodlensArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine = EmotionEngine::builder().config(config).build()?;
    let text = read_text(&args.text)?;
    output_result("Rule-based scores", &engine.analyze_rules(&text), cli_args)
}

/// Load a model directory and list its classifiers. Unlike `analyze`, a
/// broken model directory is reported as an error.
fn list_classifiers(args: &ClassifiersArgs, cli_args: &MoodlensArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let models = DirectoryLoader::new(&args.models).load()?;
    let engine = EmotionEngine::builder()
        .config(config)
        .models(models)
        .build()?;
    output_result("Classifiers", &engine.classifier_info(), cli_args)
}

/// Summarize a JSON array of analysis records.
fn summarize(args: &SummarizeArgs, cli_args: &MoodlensArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine = EmotionEngine::builder().config(config).build()?;

    let content = std::fs::read_to_string(&args.records)?;
    let records: Vec<AnalysisRecord> = serde_json::from_str(&content)?;
    let now = match &args.now {
        Some(now) => parse_time(now)?,
        None => SystemClock.now(),
    };

    let summary = engine.summarize(&records, now);
    output_result("Analytics summary", &summary, cli_args)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path),
        None => Ok(EngineConfig::default()),
    }
}

/// The text argument, or standard input when it is "-".
fn read_text(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(arg.to_string())
    }
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| MoodlensError::invalid_argument(format!("invalid --now '{value}': {e}")))
}
