//! CLI argument parsing for buildprof

use crate::self_time::NestingStrategy;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for self-time rows
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    Text,
    /// JSON document with a summary
    Json,
    /// One JSON row per line
    Ndjson,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "buildprof")]
#[command(version)]
#[command(about = "Self-time statistics for Chrome trace-event build profiles", long_about = None)]
pub struct Cli {
    /// Build profiles to ingest (.json or .json.gz)
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Nesting reconstruction used for self-time
    #[arg(long = "nesting", value_enum)]
    pub nesting: Option<NestingStrategy>,

    /// Job name attached to every row
    #[arg(short = 'j', long = "job", value_name = "NAME")]
    pub job: Option<String>,

    /// Ingestion date attached to every row (YYYY-MM-DD, default: today)
    #[arg(long = "date", value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Only ingest files whose path matches the profile path pattern
    #[arg(long = "enforce-path")]
    pub enforce_path: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
