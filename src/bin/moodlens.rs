//! Moodlens CLI binary.

use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use moodlens::cli::args::*;
use moodlens::cli::commands::*;

fn main() {
    let args = MoodlensArgs::parse();

    // RUST_LOG wins at the default verbosity.
    let filter = match args.verbosity() {
        0 => EnvFilter::new("error"),
        1 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        2 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
