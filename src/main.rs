//! Seqkit - order-preserving aggregation of async tasks
//!
//! A CLI that drives task-list scenarios through the all-of aggregator
//! and demonstrates the sequence utilities.
//!
//! Exit codes:
//!   0 - Success (every scenario produced its values)
//!   1 - Runtime error (bad arguments, unreadable scenario or config, etc.)
//!   2 - A scenario failed or exceeded its deadline

mod cli;
mod config;

use anyhow::{Context, Result};
use cli::{Args, Command, OutputFormat};
use config::{Config, RuntimeFlavor, CONFIG_FILE};
use seqkit::models::RunReport;
use seqkit::scenario::{self, RunOptions};
use seqkit::{report, seq};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    match run(args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\nError: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .seqkit.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("Created {} with default settings.", CONFIG_FILE);
    println!("Edit it to change the runtime flavor, time scale or deadline.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration, merge CLI flags and dispatch the subcommand.
/// Returns the exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("Seqkit v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let format = config.output_format()?;

    let (output, exit_code) = match &args.command {
        Command::Run { scenario, .. } => {
            let scenario = scenario::load(scenario)?;
            let runtime = build_runtime(&config)?;
            let options = run_options(&config);
            let report = runtime.block_on(scenario::run_scenario(&scenario, &options));
            render_runs(&[report], format)?
        }
        Command::Demo { .. } => {
            let runtime = build_runtime(&config)?;
            let options = run_options(&config);
            let reports = runtime.block_on(async {
                let mut reports = Vec::new();
                for scenario in scenario::demo_scenarios() {
                    reports.push(scenario::run_scenario(&scenario, &options).await);
                }
                reports
            });
            render_runs(&reports, format)?
        }
        Command::Seq { values } => {
            let summary = seq::summarize(values)?;
            let output = match format {
                OutputFormat::Text => report::generate_seq_text(&summary),
                OutputFormat::Json => report::generate_seq_json(&summary)?,
            };
            (output, 0)
        }
        Command::InitConfig => return Ok(0),
    };

    match &args.output {
        Some(path) => {
            report::write_output(&output, path)?;
            info!("Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(exit_code)
}

/// Render run reports and derive the exit code from their outcomes.
fn render_runs(reports: &[RunReport], format: OutputFormat) -> Result<(String, i32)> {
    let output = match format {
        OutputFormat::Text => report::generate_text_report(reports),
        OutputFormat::Json => report::generate_json_report(reports)?,
    };

    let failed = reports.iter().filter(|r| !r.outcome.is_success()).count();
    if failed > 0 {
        warn!("{} of {} scenario(s) did not succeed", failed, reports.len());
        return Ok((output, 2));
    }

    Ok((output, 0))
}

fn run_options(config: &Config) -> RunOptions {
    RunOptions {
        time_scale: config.scenario.time_scale,
        deadline: config.scenario.deadline_ms.map(Duration::from_millis),
        show_progress: config.scenario.show_progress,
    }
}

/// Build the tokio runtime described by the `[runtime]` section.
fn build_runtime(config: &Config) -> Result<tokio::runtime::Runtime> {
    let mut builder = match config.runtime.flavor {
        RuntimeFlavor::CurrentThread => tokio::runtime::Builder::new_current_thread(),
        RuntimeFlavor::MultiThread => {
            let mut builder = tokio::runtime::Builder::new_multi_thread();
            builder.worker_threads(config.runtime.worker_threads);
            builder
        }
    };

    debug!("Starting {:?} runtime", config.runtime.flavor);
    builder
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("Warning: failed to load {}: {:#}", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
