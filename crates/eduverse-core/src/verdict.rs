//! Verdict interpretation.
//!
//! Turns an [`ExecutionOutcome`] into the learner-facing [`Verdict`], keeping
//! internal causes out of the message.

use std::time::Duration;

use crate::results::{ExecutionOutcome, OutcomeKind, OutcomeStatus, Verdict};

/// Message shown when grading failed for reasons unrelated to the submission.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "Your submission could not be graded because of a server problem. Please try again.";

/// A verdict plus what the caller needs to log it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub verdict: Verdict,
    pub kind: OutcomeKind,
    /// Underlying cause of an internal error, for the caller's error channel.
    pub internal_cause: Option<String>,
}

impl Interpretation {
    fn new(kind: OutcomeKind, verdict: Verdict) -> Self {
        Self {
            verdict,
            kind,
            internal_cause: None,
        }
    }

    /// The verdict for a cycle that has no harness.
    pub fn not_graded() -> Self {
        Self::new(OutcomeKind::Success, Verdict::pass())
    }
}

/// Classify `outcome` and build its verdict.
pub fn interpret(outcome: &ExecutionOutcome) -> Interpretation {
    let kind = outcome.kind();
    match &outcome.status {
        _ if kind == OutcomeKind::Success => Interpretation::new(kind, Verdict::pass()),
        OutcomeStatus::Exited { code } => {
            let message = if outcome.stderr.is_empty() {
                match code {
                    Some(code) => format!("Program exited with status {code}."),
                    None => "Program was terminated before it finished.".to_string(),
                }
            } else {
                outcome.stderr.clone()
            };
            Interpretation::new(kind, Verdict::fail(message))
        }
        OutcomeStatus::TimedOut { limit } => {
            Interpretation::new(kind, Verdict::fail(timeout_message(*limit)))
        }
        OutcomeStatus::InternalError { cause } => Interpretation {
            verdict: Verdict::fail(INTERNAL_ERROR_MESSAGE),
            kind,
            internal_cause: Some(cause.clone()),
        },
    }
}

/// Fixed notice for a run that exceeded `limit`.
pub fn timeout_message(limit: Duration) -> String {
    format!(
        "Time limit exceeded: the program did not finish within {}. Check for infinite loops.",
        format_limit(limit)
    )
}

fn format_limit(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        match limit.as_secs() {
            1 => "1 second".to_string(),
            secs => format!("{secs} seconds"),
        }
    } else {
        format!("{} ms", limit.as_millis())
    }
}

/// Compare a standalone run of the submission against the cycle's expected
/// output.
///
/// Returns `None` when the run succeeded and printed the expected text, so
/// grading should continue with the harness.
pub fn check_print_output(outcome: &ExecutionOutcome, expected: &str) -> Option<Interpretation> {
    if outcome.kind() != OutcomeKind::Success {
        return Some(interpret(outcome));
    }
    let actual = outcome.stdout.trim();
    let expected = expected.trim();
    if actual == expected {
        return None;
    }
    Some(Interpretation::new(
        OutcomeKind::GradedFailure,
        Verdict::fail(format!(
            "Output mismatch.\nExpected:\n'{expected}'\n\nActual:\n'{actual}'"
        )),
    ))
}

/// Condense a diagnostic stream into one line for submission logs.
///
/// Prefers the detail of an `AssertionError`, then the last non-empty line
/// without its `SomethingError: ` prefix.
pub fn summarize_diagnostic(text: &str) -> String {
    const ASSERTION: &str = "AssertionError:";
    if let Some(pos) = text.find(ASSERTION) {
        let detail = text[pos + ASSERTION.len()..]
            .lines()
            .next()
            .unwrap_or_default()
            .trim();
        if !detail.is_empty() {
            return detail.to_string();
        }
    }

    let Some(last) = text.lines().map(str::trim).filter(|l| !l.is_empty()).last() else {
        return text.to_string();
    };
    if let Some((name, rest)) = last.split_once(':') {
        let rest = rest.trim();
        if is_error_name(name) && !rest.is_empty() {
            return rest.to_string();
        }
    }
    last.to_string()
}

fn is_error_name(name: &str) -> bool {
    name.ends_with("Error") && name.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}
