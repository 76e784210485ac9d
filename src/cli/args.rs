//! Command line argument parsing for the moodlens CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Moodlens - ensemble emotion labeling for free text
#[derive(Parser, Debug, Clone)]
#[command(name = "moodlens")]
#[command(about = "Label the emotion of free text with a classifier ensemble and keyword rules")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct MoodlensArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl MoodlensArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze a text with the ensemble and the rule-based adjuster
    Analyze(AnalyzeArgs),

    /// Score a text with the keyword rules only
    Rules(RulesArgs),

    /// List the classifiers of a model directory
    Classifiers(ClassifiersArgs),

    /// Summarize a history of analysis records
    Summarize(SummarizeArgs),
}

/// Arguments for a full analysis
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Text to analyze; "-" reads standard input
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Model directory containing manifest.json
    #[arg(short, long, value_name = "DIR", env = "MOODLENS_MODELS")]
    pub models: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for rule-based scoring
#[derive(Parser, Debug, Clone)]
pub struct RulesArgs {
    /// Text to score; "-" reads standard input
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for listing classifiers
#[derive(Parser, Debug, Clone)]
pub struct ClassifiersArgs {
    /// Model directory containing manifest.json
    #[arg(short, long, value_name = "DIR", env = "MOODLENS_MODELS")]
    pub models: PathBuf,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for summarizing records
#[derive(Parser, Debug, Clone)]
pub struct SummarizeArgs {
    /// JSON file holding an array of analysis records
    #[arg(value_name = "RECORDS_JSON")]
    pub records: PathBuf,

    /// Reference time (RFC 3339); defaults to the current time
    #[arg(long, value_name = "RFC3339")]
    pub now: Option<String>,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity() {
        let args = MoodlensArgs::try_parse_from(["moodlens", "rules", "hi"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = MoodlensArgs::try_parse_from(["moodlens", "-vv", "rules", "hi"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = MoodlensArgs::try_parse_from(["moodlens", "-q", "-vv", "rules", "hi"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            MoodlensArgs::try_parse_from(["moodlens", "--format", "json", "--pretty", "rules", "hi"])
                .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.pretty);
    }

    #[test]
    fn test_summarize_args() {
        let args = MoodlensArgs::try_parse_from([
            "moodlens",
            "summarize",
            "records.json",
            "--now",
            "2024-06-01T00:00:00Z",
        ])
        .unwrap();

        if let Command::Summarize(summarize) = args.command {
            assert_eq!(summarize.records, PathBuf::from("records.json"));
            assert_eq!(summarize.now.as_deref(), Some("2024-06-01T00:00:00Z"));
        } else {
            panic!("Expected Summarize command");
        }
    }
}
