//! Scenario files and the built-in demo scenarios.
//!
//! A scenario is a named task list stored as TOML; see [`TaskSpec`] for the
//! task kinds.

pub mod runner;

pub use runner::{build_tasks, run_scenario, RunOptions};

use crate::models::{Scenario, TaskSpec};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

/// Load a scenario from a TOML file.
pub fn load(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

    let scenario: Scenario = toml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {}", path.display()))?;

    Ok(scenario)
}

/// The two reference scenarios: a mixed successful run and a single failure.
pub fn demo_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "mixed".to_string(),
            tasks: vec![
                TaskSpec::Resolve {
                    value: json!(3),
                    after_ms: 0,
                },
                TaskSpec::Ready { value: json!(1337) },
                TaskSpec::Resolve {
                    value: json!("foo"),
                    after_ms: 2000,
                },
            ],
        },
        Scenario {
            name: "failing".to_string(),
            tasks: vec![TaskSpec::Reject {
                error: "boom".to_string(),
                after_ms: 0,
            }],
        },
    ]
}
