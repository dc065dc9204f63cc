//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.seqkit.toml` files.

use crate::cli::{Args, Command, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".seqkit.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Async runtime settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Scenario run settings.
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output format: "text" or "json".
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            verbose: false,
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

/// Runtime flavor for driving scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeFlavor {
    /// One thread; callbacks never run concurrently.
    #[default]
    CurrentThread,
    /// Work-stealing thread pool.
    MultiThread,
}

/// Async runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Scheduler flavor.
    #[serde(default)]
    pub flavor: RuntimeFlavor,

    /// Worker threads for the multi-thread flavor.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flavor: RuntimeFlavor::default(),
            worker_threads: default_worker_threads(),
        }
    }
}

fn default_worker_threads() -> usize {
    2
}

/// Scenario run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Multiplier applied to every task delay.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// Abandon a run after this many milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,

    /// Show a spinner while tasks are in flight.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
            deadline_ms: None,
            show_progress: true,
        }
    }
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !self.scenario.time_scale.is_finite() || self.scenario.time_scale < 0.0 {
            anyhow::bail!("scenario.time_scale must be a non-negative number");
        }
        if self.scenario.deadline_ms == Some(0) {
            anyhow::bail!("scenario.deadline_ms must be at least 1");
        }
        if self.runtime.worker_threads == 0 {
            anyhow::bail!("runtime.worker_threads must be at least 1");
        }
        self.output_format()?;
        Ok(())
    }

    /// The configured output format.
    pub fn output_format(&self) -> Result<OutputFormat> {
        match self.general.format.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("Unknown output format '{}' (expected text or json)", other),
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(format) = args.format {
            self.general.format = match format {
                OutputFormat::Text => "text",
                OutputFormat::Json => "json",
            }
            .to_string();
        }

        match &args.command {
            Command::Run {
                time_scale,
                deadline_ms,
                ..
            } => {
                if let Some(scale) = time_scale {
                    self.scenario.time_scale = *scale;
                }
                if deadline_ms.is_some() {
                    self.scenario.deadline_ms = *deadline_ms;
                }
            }
            Command::Demo {
                time_scale: Some(scale),
            } => self.scenario.time_scale = *scale,
            _ => {}
        }

        // Quiet runs never draw a spinner
        if args.quiet {
            self.scenario.show_progress = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
