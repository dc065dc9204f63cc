//! Report generation.
//!
//! Renders run reports and sequence-demo results as plain text or JSON.

use crate::models::{Outcome, RunReport, SeqReport};
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Generate a plain-text report for one or more runs.
pub fn generate_text_report(reports: &[RunReport]) -> String {
    let mut output = String::new();

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&generate_run_section(report));
    }

    output
}

/// Generate the section for a single run.
fn generate_run_section(report: &RunReport) -> String {
    let mut section = String::new();

    section.push_str(&format!("Scenario: {}\n", report.scenario));
    section.push_str(&format!(
        "Started:  {}\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "Tasks:    {} ({} settled)\n",
        report.task_count, report.settled_count
    ));
    section.push_str(&format!("Outcome:  {}\n", report.outcome));
    section.push_str(&generate_outcome_detail(&report.outcome));
    section.push_str(&format!("Elapsed:  {}ms\n", report.elapsed_ms));

    section
}

fn generate_outcome_detail(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Succeeded { values } => format!("Values:   {}\n", format_values(values)),
        Outcome::Failed { index, error } => format!("Error:    task {}: {}\n", index, error),
        Outcome::DeadlineExceeded { deadline_ms } => {
            format!("Deadline: {}ms\n", deadline_ms)
        }
    }
}

/// Formats values as a compact list, e.g. `[3, 1337, "foo"]`.
fn format_values(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Generate a JSON report for one or more runs.
pub fn generate_json_report(reports: &[RunReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).map_err(Into::into)
}

/// Generate the plain-text output of the sequence demo.
pub fn generate_seq_text(report: &SeqReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Original:   {:?}\n", report.original));
    output.push_str(&format!("Squares:    {:?}\n", report.squares));
    output.push_str(&format!("Only odds:  {:?}\n", report.odds));
    output.push_str(&format!("Sum:        {}\n", report.sum));
    match report.first_even {
        Some(even) => output.push_str(&format!("First even: {}\n", even)),
        None => output.push_str("First even: none\n"),
    }
    output.push_str("Each:\n");
    for line in &report.visited {
        output.push_str(&format!("  {}\n", line));
    }

    output
}

/// Generate the JSON output of the sequence demo.
pub fn generate_seq_json(report: &SeqReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered output to a file.
pub fn write_output(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write output to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_report(outcome: Outcome) -> RunReport {
        RunReport {
            scenario: "mixed".to_string(),
            task_count: 3,
            settled_count: 3,
            started_at: Utc::now(),
            elapsed_ms: 2001,
            outcome,
        }
    }

    #[test]
    fn test_text_report_success() {
        let report = create_test_report(Outcome::Succeeded {
            values: vec![json!(3), json!(1337), json!("foo")],
        });
        let text = generate_text_report(&[report]);

        assert!(text.contains("Scenario: mixed"));
        assert!(text.contains("Outcome:  succeeded"));
        assert!(text.contains("Values:   [3, 1337, \"foo\"]"));
        assert!(text.contains("Elapsed:  2001ms"));
    }

    #[test]
    fn test_text_report_failure_and_deadline() {
        let failed = create_test_report(Outcome::Failed {
            index: 0,
            error: "boom".to_string(),
        });
        let late = create_test_report(Outcome::DeadlineExceeded { deadline_ms: 50 });
        let text = generate_text_report(&[failed, late]);

        assert!(text.contains("Error:    task 0: boom"));
        assert!(text.contains("Deadline: 50ms"));
        assert_eq!(text.matches("Scenario: ").count(), 2);
    }

    #[test]
    fn test_json_report() {
        let report = create_test_report(Outcome::Succeeded {
            values: vec![json!(1)],
        });
        let json = generate_json_report(&[report]).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0]["scenario"], "mixed");
        assert_eq!(parsed[0]["outcome"]["status"], "succeeded");
        assert_eq!(parsed[0]["outcome"]["values"], json!([1]));
    }

    #[test]
    fn test_seq_text() {
        let report = SeqReport {
            original: vec![1, 2],
            squares: vec![1, 4],
            odds: vec![1],
            sum: 3,
            first_even: None,
            visited: vec!["0: 1".to_string(), "1: 2".to_string()],
        };
        let text = generate_seq_text(&report);

        assert!(text.contains("Squares:    [1, 4]"));
        assert!(text.contains("First even: none"));
        assert!(text.contains("  1: 2\n"));
    }

    #[test]
    fn test_write_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        write_output("hello", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }
}
