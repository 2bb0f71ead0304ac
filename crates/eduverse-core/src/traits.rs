//! Collaborator trait definitions.
//!
//! The grading service reads scenarios and learner profiles through these
//! traits and hands combined programs to a [`SourceExecutor`]. The
//! `eduverse-store` and `eduverse-runner` crates provide implementations.

use std::time::Duration;

use async_trait::async_trait;

use crate::model::{LearnerProfile, Scenario};
use crate::results::ExecutionOutcome;

// ---------------------------------------------------------------------------
// Read-only stores
// ---------------------------------------------------------------------------

/// Lookup of curriculum scenarios by week number.
#[async_trait]
pub trait ScenarioStore: Send + Sync {
    /// Fetch the scenario for `week`, or `None` if there is none.
    async fn scenario(&self, week: u32) -> anyhow::Result<Option<Scenario>>;
}

/// Lookup of learner profiles by learner identifier.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for `learner_id`, or `None` if unknown.
    async fn profile(&self, learner_id: &str) -> anyhow::Result<Option<LearnerProfile>>;
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Runs a program in a fresh, single-purpose process.
///
/// Implementations never fail past this boundary: spawn errors, storage
/// errors and timeouts are all reported through the returned outcome, and
/// any temporary storage is released before `execute` returns.
#[async_trait]
pub trait SourceExecutor: Send + Sync {
    async fn execute(&self, program: &str, timeout: Duration) -> ExecutionOutcome;
}
