//! Scenario execution.
//!
//! Turns a [`Scenario`] into a task list, aggregates it on the current
//! tokio runtime and reports how the run ended.

use crate::error::TaskFailure;
use crate::future::{aggregate, channel, Pending, Task};
use crate::models::{Outcome, RunReport, Scenario, TaskSpec};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Options for a scenario run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Multiplier applied to every task delay.
    pub time_scale: f64,
    /// Give up on the run after this long. The aggregate itself has no timeout.
    pub deadline: Option<Duration>,
    /// Show a spinner while tasks are in flight.
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            deadline: None,
            show_progress: false,
        }
    }
}

/// Builds the task list for `scenario`, in input order.
///
/// Delays are measured from the first poll, which must happen inside a
/// tokio runtime.
pub fn build_tasks(scenario: &Scenario, time_scale: f64) -> Vec<Task<Value, TaskFailure>> {
    scenario
        .tasks
        .iter()
        .enumerate()
        .map(|(index, spec)| match spec {
            TaskSpec::Ready { value } => Task::ready(value.clone()),
            TaskSpec::Resolve { value, after_ms: 0 } => Pending::resolved(value.clone()).into(),
            TaskSpec::Resolve { value, after_ms } => {
                Pending::after(scaled(*after_ms, time_scale), Ok(value.clone())).into()
            }
            TaskSpec::Reject { error, after_ms: 0 } => {
                Pending::rejected(TaskFailure::new(index, error.as_str())).into()
            }
            TaskSpec::Reject { error, after_ms } => Pending::after(
                scaled(*after_ms, time_scale),
                Err(TaskFailure::new(index, error.as_str())),
            )
            .into(),
            TaskSpec::Never => {
                // Dropping the resolver leaves the computation unsettled forever.
                let (pending, _) = channel();
                pending.into()
            }
        })
        .collect()
}

/// Delays too large for a `Duration` saturate rather than wrap.
fn scaled(after_ms: u64, time_scale: f64) -> Duration {
    Duration::try_from_secs_f64(after_ms as f64 * time_scale / 1000.0).unwrap_or(Duration::MAX)
}

fn spinner(task_count: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("0/{} tasks settled", task_count));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Runs `scenario` to completion (or until the deadline passes).
pub async fn run_scenario(scenario: &Scenario, options: &RunOptions) -> RunReport {
    info!(
        "Running scenario '{}' ({} tasks)",
        scenario.name,
        scenario.tasks.len()
    );
    match scenario.expected_duration_ms() {
        Some(ms) => debug!("Expected to settle after ~{}ms (unscaled)", ms),
        None => warn!("Scenario '{}' contains a task that never settles", scenario.name),
    }

    let started_at = Utc::now();
    let start = Instant::now();

    let mut all = aggregate(build_tasks(scenario, options.time_scale));
    let task_count = all.len();
    let progress = options.show_progress.then(|| spinner(task_count));

    let deadline = async {
        match options.deadline {
            Some(deadline) => tokio::time::sleep(deadline).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    let result = loop {
        tokio::select! {
            result = &mut all => break Some(result),
            _ = &mut deadline => break None,
            _ = ticker.tick(), if progress.is_some() => {
                if let Some(pb) = &progress {
                    pb.set_message(format!("{}/{} tasks settled", all.settled(), task_count));
                }
            }
        }
    };

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let outcome = match result {
        Some(Ok(values)) => Outcome::Succeeded { values },
        Some(Err(failure)) => Outcome::Failed {
            index: failure.index,
            error: failure.message,
        },
        None => Outcome::DeadlineExceeded {
            deadline_ms: options
                .deadline
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
        },
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    info!(
        "Scenario '{}' {} after {}ms",
        scenario.name, outcome, elapsed_ms
    );

    RunReport {
        scenario: scenario.name.clone(),
        task_count,
        settled_count: all.settled(),
        started_at,
        elapsed_ms,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario(tasks: Vec<TaskSpec>) -> Scenario {
        Scenario {
            name: "test".to_string(),
            tasks,
        }
    }

    fn resolve(value: Value, after_ms: u64) -> TaskSpec {
        TaskSpec::Resolve { value, after_ms }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_mixed_scenario() {
        let scenario = scenario(vec![
            resolve(json!(3), 0),
            TaskSpec::Ready { value: json!(1337) },
            resolve(json!("foo"), 2000),
        ]);

        let report = run_scenario(&scenario, &RunOptions::default()).await;

        assert_eq!(
            report.outcome,
            Outcome::Succeeded {
                values: vec![json!(3), json!(1337), json!("foo")]
            }
        );
        assert_eq!(report.task_count, 3);
        assert_eq!(report.settled_count, 3);
        assert!(report.elapsed_ms >= 2000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_failing_index() {
        let scenario = scenario(vec![
            resolve(json!(1), 1000),
            TaskSpec::Reject {
                error: "boom".to_string(),
                after_ms: 50,
            },
        ]);

        let report = run_scenario(&scenario, &RunOptions::default()).await;

        assert_eq!(
            report.outcome,
            Outcome::Failed {
                index: 1,
                error: "boom".to_string()
            }
        );
        assert!(report.elapsed_ms < 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_scale_shortens_delays() {
        let scenario = scenario(vec![resolve(json!("slow"), 4000)]);
        let options = RunOptions {
            time_scale: 0.25,
            ..RunOptions::default()
        };

        let report = run_scenario(&scenario, &options).await;

        assert!(report.outcome.is_success());
        assert!(report.elapsed_ms >= 1000);
        assert!(report.elapsed_ms < 2000);
    }

    #[test]
    fn test_time_scale_saturates() {
        assert_eq!(scaled(2000, 0.5), Duration::from_millis(1000));
        assert_eq!(scaled(2000, 0.0), Duration::ZERO);

        let large = scaled(2000, 1e15);
        let huge = scaled(2000, 1e20);
        assert_eq!(huge, Duration::MAX);
        assert!(huge >= large);
        assert!(huge > Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_saturated_delay_hits_deadline() {
        let scenario = scenario(vec![resolve(json!("late"), 2000)]);
        let options = RunOptions {
            time_scale: 1e20,
            deadline: Some(Duration::from_millis(5000)),
            ..RunOptions::default()
        };

        let report = run_scenario(&scenario, &options).await;

        assert_eq!(
            report.outcome,
            Outcome::DeadlineExceeded { deadline_ms: 5000 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_never_settling_run() {
        let scenario = scenario(vec![TaskSpec::Ready { value: json!(1) }, TaskSpec::Never]);
        let options = RunOptions {
            deadline: Some(Duration::from_millis(500)),
            ..RunOptions::default()
        };

        let report = run_scenario(&scenario, &options).await;

        assert_eq!(
            report.outcome,
            Outcome::DeadlineExceeded { deadline_ms: 500 }
        );
        assert_eq!(report.settled_count, 1);
    }

    #[tokio::test]
    async fn test_empty_scenario_succeeds() {
        let report = run_scenario(&scenario(vec![]), &RunOptions::default()).await;
        assert_eq!(report.outcome, Outcome::Succeeded { values: vec![] });
        assert_eq!(report.task_count, 0);
    }

    #[tokio::test]
    async fn test_build_tasks_keeps_plain_values_ready() {
        let scenario = scenario(vec![
            TaskSpec::Ready { value: json!("a") },
            resolve(json!("b"), 10),
            TaskSpec::Never,
        ]);
        let tasks = build_tasks(&scenario, 1.0);
        let pending: Vec<bool> = tasks.iter().map(Task::is_pending).collect();
        assert_eq!(pending, vec![false, true, true]);
    }
}
