//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Seqkit - order-preserving aggregation of async tasks
///
/// Runs task-list scenarios through the all-of aggregator and
/// demonstrates the sequence utilities.
///
/// Examples:
///   seqkit run fixtures/mixed.toml
///   seqkit run fixtures/failing.toml --format json --deadline-ms 5000
///   seqkit demo
///   seqkit seq --values 1,3,4,6,7,8
///   seqkit init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .seqkit.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT", global = true, env = "SEQKIT_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Aggregate the tasks of a scenario file
    Run {
        /// Scenario file (TOML)
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,

        /// Multiplier applied to every task delay
        #[arg(long, value_name = "FACTOR")]
        time_scale: Option<f64>,

        /// Give up after this many milliseconds
        ///
        /// The aggregator has no timeout of its own; a task that never
        /// settles keeps the run pending until this deadline.
        #[arg(long, value_name = "MS")]
        deadline_ms: Option<u64>,
    },

    /// Run the built-in demo scenarios
    Demo {
        /// Multiplier applied to every task delay
        #[arg(long, value_name = "FACTOR")]
        time_scale: Option<f64>,
    },

    /// Apply map, filter, reduce, find and for_each to a list of numbers
    Seq {
        /// Comma-separated integers
        #[arg(
            long,
            value_name = "NUMS",
            value_delimiter = ',',
            allow_hyphen_values = true,
            default_values_t = vec![1, 3, 4, 6, 7, 8]
        )]
        values: Vec<i64>,
    },

    /// Generate a default .seqkit.toml configuration file
    InitConfig,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        let time_scale = match &self.command {
            Command::Run {
                scenario,
                time_scale,
                deadline_ms,
            } => {
                if !scenario.exists() {
                    return Err(format!(
                        "Scenario file does not exist: {}",
                        scenario.display()
                    ));
                }
                if *deadline_ms == Some(0) {
                    return Err("Deadline must be at least 1 millisecond".to_string());
                }
                *time_scale
            }
            Command::Demo { time_scale } => *time_scale,
            Command::Seq { .. } | Command::InitConfig => None,
        };

        // Validate time scale range
        if let Some(scale) = time_scale {
            if !scale.is_finite() || scale < 0.0 {
                return Err("Time scale must be a non-negative number".to_string());
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
