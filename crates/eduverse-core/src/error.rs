//! Grading rejection types.
//!
//! These errors are returned before any process is spawned. Failures that
//! happen while a submission runs are carried by
//! [`ExecutionOutcome`](crate::results::ExecutionOutcome) instead.

use thiserror::Error;

/// Reasons a grading request is rejected.
#[derive(Debug, Error)]
pub enum GradeError {
    /// A request field is missing or malformed.
    #[error("invalid request: {field} {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    /// No scenario exists for the requested week.
    #[error("no scenario for week {week}")]
    ScenarioNotFound { week: u32 },

    /// The cycle index is outside the scenario's cycle list.
    #[error("cycle {cycle} out of range for week {week} ({available} cycles)")]
    CycleOutOfRange {
        week: u32,
        cycle: usize,
        available: usize,
    },

    /// The learner profile could not be resolved.
    #[error("learner profile not found: {0}")]
    LearnerNotFound(String),

    /// A collaborator store failed while looking something up.
    #[error("store lookup failed: {0}")]
    Store(String),
}

impl GradeError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        GradeError::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn store(err: anyhow::Error) -> Self {
        GradeError::Store(format!("{err:#}"))
    }

    /// Returns `true` if the caller sent a request that can never succeed as-is.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, GradeError::Store(_))
    }

    /// Returns `true` if a referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GradeError::ScenarioNotFound { .. }
                | GradeError::CycleOutOfRange { .. }
                | GradeError::LearnerNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let err = GradeError::CycleOutOfRange {
            week: 1,
            cycle: 9,
            available: 3,
        };
        assert!(err.is_client_error());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "cycle 9 out of range for week 1 (3 cycles)");

        let err = GradeError::invalid("week", "is missing");
        assert!(err.is_client_error());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "invalid request: week is missing");

        let err = GradeError::store(anyhow::anyhow!("connection reset"));
        assert!(!err.is_client_error());
    }
}
