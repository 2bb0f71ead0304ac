//! Submission log records.
//!
//! The grading service never writes logs itself; callers build a record from
//! a [`GradeReport`] and store it wherever their analytics live.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grader::{GradeReport, SubmissionState};
use crate::verdict::summarize_diagnostic;

/// One graded submission, as recorded for analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionLogRecord {
    pub log_id: Uuid,
    pub learner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    pub week: u32,
    pub cycle: usize,
    pub is_success: bool,
    /// Short failure detail; empty on success.
    #[serde(default)]
    pub error: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionLogRecord {
    pub fn from_report(report: &GradeReport) -> Self {
        let error = match report.state {
            SubmissionState::Succeeded => String::new(),
            SubmissionState::GradedFailed => summarize_diagnostic(&report.verdict.message),
            _ => report.verdict.message.clone(),
        };
        Self {
            log_id: Uuid::new_v4(),
            learner_id: report.learner_id.clone(),
            class_id: report.class_id.clone(),
            week: report.week,
            cycle: report.cycle,
            is_success: report.verdict.success,
            error,
            submitted_at: Utc::now(),
        }
    }

    /// Append this record as one JSON line to `path`, creating the file.
    pub fn append_jsonl(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let line = serde_json::to_string(self).context("failed to serialize log record")?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open submission log: {}", path.display()))?;
        writeln!(file, "{line}")
            .with_context(|| format!("failed to write submission log: {}", path.display()))?;
        Ok(())
    }
}

/// Read every record from a JSON-lines log.
pub fn read_jsonl(path: &Path) -> Result<Vec<SubmissionLogRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission log: {}", path.display()))?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}: bad record on line {}", path.display(), i + 1))
        })
        .collect()
}
