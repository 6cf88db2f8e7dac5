//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// TripStat - trip statistics calculator with calculation explanations
///
/// Compute fleet statistics (counts, volumes, utilizations, time and
/// distance aggregates) from trip data JSON and generate a step-by-step
/// explanation of every number. Text/JSON reports. Built in Rust.
///
/// Examples:
///   tripstat --input trips.json
///   tripstat --input trips.json --unit miles --output fleet_report.txt
///   cat trips.json | tripstat --input - --format json
///   tripstat --sample
///   tripstat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the trip data JSON file, or `-` to read from stdin
    ///
    /// The top-level JSON value must be an array of trip records.
    /// Not required when using --sample or --init-config.
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present_any = ["sample", "init_config"],
        conflicts_with = "sample"
    )]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// If not specified, uses the config file setting or tripstat_report.txt.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format (text, json)
    ///
    /// Overrides the config file setting.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Distance unit for display formatting
    ///
    /// `miles` selects miles; any other value falls back to kilometers.
    /// Can also be set via TRIPSTAT_UNIT env var or .tripstat.toml config.
    #[arg(short, long, value_name = "UNIT", env = "TRIPSTAT_UNIT")]
    pub unit: Option<String>,

    /// Run on the built-in sample dataset instead of reading input
    #[arg(long)]
    pub sample: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tripstat.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .tripstat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain-text calculation explanation (default)
    #[default]
    Text,
    /// JSON report with statistics and metadata
    Json,
}

impl OutputFormat {
    /// Parse a format selector leniently: `"json"` selects JSON, every
    /// other value falls back to text.
    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate the input path if provided (stdin is always accepted)
        if let Some(ref input) = self.input {
            if input != &PathBuf::from("-") {
                if !input.exists() {
                    return Err(format!("Input file does not exist: {}", input.display()));
                }
                if input.is_dir() {
                    return Err(format!("Input path is a directory: {}", input.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
