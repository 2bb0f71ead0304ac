//! Execution outcomes and learner-facing verdicts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a spawned program ended, as seen by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The process exited on its own. `code` is `None` when it was
    /// terminated by a signal.
    Exited { code: Option<i32> },
    /// The process was still running when `limit` elapsed and was killed.
    TimedOut { limit: Duration },
    /// The program could not be materialized, spawned, awaited or cleaned up.
    InternalError { cause: String },
}

/// Everything the executor observed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub status: OutcomeStatus,
    pub stdout: String,
    /// Diagnostic stream text.
    pub stderr: String,
    pub elapsed: Duration,
}

impl ExecutionOutcome {
    pub fn exited(
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            status: OutcomeStatus::Exited { code },
            stdout: stdout.into(),
            stderr: stderr.into(),
            elapsed,
        }
    }

    pub fn timed_out(limit: Duration, elapsed: Duration) -> Self {
        Self {
            status: OutcomeStatus::TimedOut { limit },
            stdout: String::new(),
            stderr: String::new(),
            elapsed,
        }
    }

    pub fn internal(cause: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status: OutcomeStatus::InternalError {
                cause: cause.into(),
            },
            stdout: String::new(),
            stderr: String::new(),
            elapsed,
        }
    }

    /// Classify the run. Only exit code 0 with an empty diagnostic stream
    /// counts as success.
    pub fn kind(&self) -> OutcomeKind {
        match &self.status {
            OutcomeStatus::Exited { code: Some(0) } if self.stderr.is_empty() => {
                OutcomeKind::Success
            }
            OutcomeStatus::Exited { .. } => OutcomeKind::GradedFailure,
            OutcomeStatus::TimedOut { .. } => OutcomeKind::Timeout,
            OutcomeStatus::InternalError { .. } => OutcomeKind::InternalError,
        }
    }
}

/// Classification of an [`ExecutionOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    GradedFailure,
    Timeout,
    InternalError,
}

/// The `{success, message}` result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub success: bool,
    pub message: String,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
