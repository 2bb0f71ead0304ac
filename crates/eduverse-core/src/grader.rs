//! Grading service orchestrator.
//!
//! Drives one submission through validation, content resolution, source
//! combination, execution and interpretation. Many submissions may be graded
//! concurrently; each call owns its own process and scratch storage.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::Instrument;
use uuid::Uuid;

use crate::combiner::combine;
use crate::error::GradeError;
use crate::model::{Level, SubmissionPayload, SubmissionRequest};
use crate::resolver::resolve_harness;
use crate::results::{OutcomeKind, Verdict};
use crate::traits::{ProfileStore, ScenarioStore, SourceExecutor};
use crate::validator::{validate_payload, RequestValidator};
use crate::verdict::{check_print_output, interpret, Interpretation};

/// Default wall-clock bound for one run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the grading service.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// Wall-clock bound for each spawned process.
    pub timeout: Duration,
    /// Maximum concurrent gradings in [`GradingService::grade_all`].
    pub parallelism: usize,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            parallelism: 4,
        }
    }
}

/// Lifecycle of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Received,
    Validated,
    ContentResolved,
    Combined,
    Executing,
    Succeeded,
    GradedFailed,
    TimedOut,
    Rejected,
    InternalErrored,
}

impl SubmissionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded
                | SubmissionState::GradedFailed
                | SubmissionState::TimedOut
                | SubmissionState::Rejected
                | SubmissionState::InternalErrored
        )
    }
}

impl From<OutcomeKind> for SubmissionState {
    fn from(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Success => SubmissionState::Succeeded,
            OutcomeKind::GradedFailure => SubmissionState::GradedFailed,
            OutcomeKind::Timeout => SubmissionState::TimedOut,
            OutcomeKind::InternalError => SubmissionState::InternalErrored,
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Received => "received",
            SubmissionState::Validated => "validated",
            SubmissionState::ContentResolved => "content_resolved",
            SubmissionState::Combined => "combined",
            SubmissionState::Executing => "executing",
            SubmissionState::Succeeded => "succeeded",
            SubmissionState::GradedFailed => "graded_failed",
            SubmissionState::TimedOut => "timed_out",
            SubmissionState::Rejected => "rejected",
            SubmissionState::InternalErrored => "internal_errored",
        };
        f.write_str(name)
    }
}

/// Result of grading one accepted submission.
#[derive(Debug, Clone)]
pub struct GradeReport {
    pub grading_id: Uuid,
    pub learner_id: String,
    pub class_id: Option<String>,
    pub week: u32,
    pub cycle: usize,
    pub level: Level,
    pub verdict: Verdict,
    /// Terminal state reached.
    pub state: SubmissionState,
    /// Why grading failed internally; never part of `verdict`.
    pub internal_cause: Option<String>,
    /// Whether the cycle had a harness at all.
    pub auto_graded: bool,
    pub elapsed: Duration,
}

/// The grading service.
pub struct GradingService {
    validator: RequestValidator,
    executor: Arc<dyn SourceExecutor>,
    config: GradingConfig,
}

impl GradingService {
    pub fn new(
        scenarios: Arc<dyn ScenarioStore>,
        profiles: Arc<dyn ProfileStore>,
        executor: Arc<dyn SourceExecutor>,
        config: GradingConfig,
    ) -> Self {
        Self {
            validator: RequestValidator::new(scenarios, profiles),
            executor,
            config,
        }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Grade one submission.
    ///
    /// Rejections are returned as `Err` before anything is spawned; every
    /// accepted submission ends in a [`GradeReport`].
    pub async fn grade(&self, request: &SubmissionRequest) -> Result<GradeReport, GradeError> {
        let grading_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "grade",
            %grading_id,
            learner = %request.learner_id,
            week = request.week,
            cycle = request.cycle
        );
        self.grade_inner(grading_id, request).instrument(span).await
    }

    /// Validate a raw payload, then grade it.
    pub async fn grade_payload(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<GradeReport, GradeError> {
        let request = validate_payload(payload).inspect_err(|e| {
            tracing::debug!(state = %SubmissionState::Rejected, "{e}");
        })?;
        self.grade(&request).await
    }

    /// Grade many submissions concurrently, at most `parallelism` at a time.
    ///
    /// Results come back in the order of `requests`.
    pub async fn grade_all(
        &self,
        requests: &[SubmissionRequest],
    ) -> Vec<Result<GradeReport, GradeError>> {
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let mut futures = FuturesUnordered::new();

        for (index, request) in requests.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, self.grade(request).await)
            });
        }

        let mut slots: Vec<Option<Result<GradeReport, GradeError>>> =
            (0..requests.len()).map(|_| None).collect();
        while let Some((index, result)) = futures.next().await {
            slots[index] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }

    async fn grade_inner(
        &self,
        grading_id: Uuid,
        request: &SubmissionRequest,
    ) -> Result<GradeReport, GradeError> {
        let start = Instant::now();
        tracing::debug!(state = %SubmissionState::Received);

        let resolved = match self.validator.validate(request).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!(state = %SubmissionState::Rejected, "{e}");
                return Err(e);
            }
        };
        let level = resolved.profile.level;
        tracing::debug!(state = %SubmissionState::Validated, %level);

        let report = |interpretation: Interpretation, auto_graded: bool| GradeReport {
            grading_id,
            learner_id: request.learner_id.clone(),
            class_id: resolved.profile.class_id.clone(),
            week: request.week,
            cycle: request.cycle,
            level,
            state: interpretation.kind.into(),
            verdict: interpretation.verdict,
            internal_cause: interpretation.internal_cause,
            auto_graded,
            elapsed: start.elapsed(),
        };

        let Some(harness) = resolve_harness(&resolved.cycle, level) else {
            tracing::debug!(
                state = %SubmissionState::Succeeded,
                "cycle has no harness, not auto-graded"
            );
            return Ok(report(Interpretation::not_graded(), false));
        };
        tracing::debug!(state = %SubmissionState::ContentResolved);

        if let Some(expected) = resolved.cycle.expected_output.as_deref() {
            tracing::debug!(state = %SubmissionState::Executing, "checking printed output");
            let outcome = self
                .executor
                .execute(&request.source, self.config.timeout)
                .await;
            if let Some(interpretation) = check_print_output(&outcome, expected) {
                return Ok(self.finish(report(interpretation, true)));
            }
        }

        let combined = combine(&request.source, harness);
        tracing::debug!(
            state = %SubmissionState::Combined,
            harness_line = combined.harness_first_line()
        );

        tracing::debug!(state = %SubmissionState::Executing);
        let outcome = self
            .executor
            .execute(combined.as_str(), self.config.timeout)
            .await;

        Ok(self.finish(report(interpret(&outcome), true)))
    }

    fn finish(&self, report: GradeReport) -> GradeReport {
        match &report.internal_cause {
            Some(cause) => tracing::error!(state = %report.state, "internal grading error: {cause}"),
            None => tracing::debug!(
                state = %report.state,
                elapsed_ms = report.elapsed.as_millis() as u64
            ),
        }
        report
    }
}
