//! The `eduverse-grade batch` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use eduverse_core::error::GradeError;
use eduverse_core::grader::SubmissionState;
use eduverse_core::log::SubmissionLogRecord;
use eduverse_core::model::{SubmissionPayload, SubmissionRequest};
use eduverse_core::validator::validate_payload;
use eduverse_core::verdict::summarize_diagnostic;

use super::{build_service, DataArgs};

pub async fn execute(
    submissions_path: PathBuf,
    parallelism: Option<usize>,
    data: DataArgs,
) -> Result<()> {
    let mut config = data.load_config()?;
    if let Some(parallelism) = parallelism {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
        config.parallelism = parallelism;
    }

    let content = std::fs::read_to_string(&submissions_path).with_context(|| {
        format!("failed to read submissions: {}", submissions_path.display())
    })?;
    let payloads: Vec<SubmissionPayload> = serde_json::from_str(&content).with_context(|| {
        format!("failed to parse submissions: {}", submissions_path.display())
    })?;

    let service = build_service(&config)?;

    // Payloads that fail validation are reported without being graded.
    let mut rows: Vec<Row> = Vec::with_capacity(payloads.len());
    let mut requests: Vec<SubmissionRequest> = Vec::new();
    let mut pending: Vec<usize> = Vec::new();
    for (i, payload) in payloads.iter().enumerate() {
        match validate_payload(payload) {
            Ok(request) => {
                rows.push(Row::from_request(&request));
                pending.push(i);
                requests.push(request);
            }
            Err(e) => rows.push(Row::rejected(payload, e.to_string())),
        }
    }

    eprintln!(
        "Grading {} submission(s) ({} rejected before grading)...",
        requests.len(),
        payloads.len() - requests.len()
    );
    let results = service.grade_all(&requests).await;

    for (i, result) in pending.into_iter().zip(results) {
        let row = &mut rows[i];
        match result {
            Ok(report) => {
                if let Some(path) = &config.submission_log {
                    SubmissionLogRecord::from_report(&report).append_jsonl(path)?;
                }
                row.state = report.state;
                row.message = summarize_diagnostic(&report.verdict.message);
                row.elapsed_ms = Some(report.elapsed.as_millis());
            }
            Err(e) => {
                row.state = rejection_state(&e);
                row.message = e.to_string();
            }
        }
    }

    print_summary(&rows);
    Ok(())
}

/// Store failures are the grader's fault, not the submitter's.
fn rejection_state(error: &GradeError) -> SubmissionState {
    if error.is_client_error() {
        SubmissionState::Rejected
    } else {
        SubmissionState::InternalErrored
    }
}

struct Row {
    learner: String,
    week: String,
    cycle: String,
    state: SubmissionState,
    message: String,
    elapsed_ms: Option<u128>,
}

impl Row {
    fn from_request(request: &SubmissionRequest) -> Self {
        Self {
            learner: request.learner_id.clone(),
            week: request.week.to_string(),
            cycle: request.cycle.to_string(),
            state: SubmissionState::Validated,
            message: String::new(),
            elapsed_ms: None,
        }
    }

    fn rejected(payload: &SubmissionPayload, message: String) -> Self {
        let show = |v: &Option<serde_json::Value>| match v {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
            None => "-".to_string(),
        };
        Self {
            learner: payload.learner_id.clone().unwrap_or_else(|| "-".to_string()),
            week: show(&payload.week),
            cycle: show(&payload.cycle),
            state: SubmissionState::Rejected,
            message,
            elapsed_ms: None,
        }
    }
}

fn print_summary(rows: &[Row]) {
    let mut table = Table::new();
    table.set_header(vec![
        "#", "Learner", "Week", "Cycle", "State", "Message", "Time",
    ]);

    for (i, row) in rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&row.learner),
            Cell::new(&row.week),
            Cell::new(&row.cycle),
            Cell::new(row.state),
            Cell::new(&row.message),
            Cell::new(
                row.elapsed_ms
                    .map(|ms| format!("{ms}ms"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    println!("{table}");

    let count = |state: SubmissionState| rows.iter().filter(|r| r.state == state).count();
    println!(
        "\n{} passed, {} failed, {} timed out, {} rejected, {} errored",
        count(SubmissionState::Succeeded),
        count(SubmissionState::GradedFailed),
        count(SubmissionState::TimedOut),
        count(SubmissionState::Rejected),
        count(SubmissionState::InternalErrored),
    );
}
