//! Data models for scenarios and run reports.
//!
//! This module contains the structures that describe a task list on disk
//! and the report produced once it has been aggregated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A named task list, as read from a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name used in reports.
    #[serde(default = "default_name")]
    pub name: String,
    /// Tasks, in input order.
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskSpec>,
}

fn default_name() -> String {
    "unnamed".to_string()
}

/// One entry of a scenario's task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskSpec {
    /// A plain value, not a pending computation.
    Ready { value: Value },
    /// Succeeds with `value` after `after_ms`.
    Resolve {
        value: Value,
        #[serde(default)]
        after_ms: u64,
    },
    /// Fails with `error` after `after_ms`.
    Reject {
        error: String,
        #[serde(default)]
        after_ms: u64,
    },
    /// Never settles.
    Never,
}

impl TaskSpec {
    /// Delay before this task settles, if it ever does.
    pub fn delay_ms(&self) -> Option<u64> {
        match self {
            TaskSpec::Ready { .. } => Some(0),
            TaskSpec::Resolve { after_ms, .. } | TaskSpec::Reject { after_ms, .. } => {
                Some(*after_ms)
            }
            TaskSpec::Never => None,
        }
    }
}

impl Scenario {
    /// The longest delay among tasks that settle; `None` if any task never settles.
    pub fn expected_duration_ms(&self) -> Option<u64> {
        self.tasks
            .iter()
            .map(TaskSpec::delay_ms)
            .try_fold(0, |longest, delay| delay.map(|d| longest.max(d)))
    }
}

/// How a scenario run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every task succeeded; values are in input order.
    Succeeded { values: Vec<Value> },
    /// A task failed and settled the aggregate.
    Failed { index: usize, error: String },
    /// The run was abandoned after the configured deadline.
    DeadlineExceeded { deadline_ms: u64 },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded { .. } => write!(f, "succeeded"),
            Outcome::Failed { .. } => write!(f, "failed"),
            Outcome::DeadlineExceeded { .. } => write!(f, "deadline exceeded"),
        }
    }
}

/// Report of a single scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Name of the scenario.
    pub scenario: String,
    /// Number of tasks in the list.
    pub task_count: usize,
    /// Tasks that settled successfully before the run ended.
    pub settled_count: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
    /// How the run ended.
    pub outcome: Outcome,
}

/// Results of applying the sequence utilities to a list of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqReport {
    pub original: Vec<i64>,
    pub squares: Vec<i64>,
    pub odds: Vec<i64>,
    pub sum: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_even: Option<i64>,
    /// `index: value` lines produced by `for_each`.
    pub visited: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_scenario() {
        let toml_content = r#"
name = "mixed"

[[task]]
kind = "ready"
value = 1337

[[task]]
kind = "resolve"
value = "foo"
after_ms = 2000

[[task]]
kind = "reject"
error = "boom"

[[task]]
kind = "never"
"#;

        let scenario: Scenario = toml::from_str(toml_content).unwrap();
        assert_eq!(scenario.name, "mixed");
        assert_eq!(scenario.tasks.len(), 4);
        assert_eq!(scenario.tasks[0], TaskSpec::Ready { value: json!(1337) });
        assert_eq!(
            scenario.tasks[1],
            TaskSpec::Resolve {
                value: json!("foo"),
                after_ms: 2000
            }
        );
        assert_eq!(
            scenario.tasks[2],
            TaskSpec::Reject {
                error: "boom".to_string(),
                after_ms: 0
            }
        );
        assert_eq!(scenario.tasks[3], TaskSpec::Never);
    }

    #[test]
    fn test_empty_scenario_defaults() {
        let scenario: Scenario = toml::from_str("").unwrap();
        assert_eq!(scenario.name, "unnamed");
        assert!(scenario.tasks.is_empty());
        assert_eq!(scenario.expected_duration_ms(), Some(0));
    }

    #[test]
    fn test_expected_duration() {
        let mut scenario = Scenario {
            name: "t".to_string(),
            tasks: vec![
                TaskSpec::Ready { value: json!(1) },
                TaskSpec::Resolve {
                    value: json!(2),
                    after_ms: 300,
                },
                TaskSpec::Reject {
                    error: "x".to_string(),
                    after_ms: 120,
                },
            ],
        };
        assert_eq!(scenario.expected_duration_ms(), Some(300));

        scenario.tasks.push(TaskSpec::Never);
        assert_eq!(scenario.expected_duration_ms(), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::Failed {
            index: 2,
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, json!({"status": "failed", "index": 2, "error": "boom"}));
        assert!(!outcome.is_success());
        assert_eq!(outcome.to_string(), "failed");
    }
}
