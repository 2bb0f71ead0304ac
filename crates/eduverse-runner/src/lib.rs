//! eduverse-runner: isolated execution of combined submissions.
//!
//! Each run writes the program into a fresh private directory, spawns a new
//! interpreter process on it under a wall-clock timeout in its own process
//! group, captures stdout and stderr, kills whatever the program forked, and
//! removes the directory before returning.
//!
//! Only time is bounded. The process shares the host's memory, CPU and
//! network access.

pub mod executor;
pub mod sandbox;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use eduverse_core::results::{ExecutionOutcome, OutcomeStatus};
use eduverse_core::traits::SourceExecutor;

pub use executor::Interpreter;
use sandbox::ScratchFile;

/// Executor that runs programs with a local interpreter.
pub struct LocalExecutor {
    interpreter: Interpreter,
    /// Suffix given to scratch files.
    file_suffix: String,
    /// Where per-run scratch directories go; the system temp dir if unset.
    scratch_dir: Option<PathBuf>,
    /// Processes spawned so far.
    spawns: AtomicU64,
}

impl LocalExecutor {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: Interpreter::new(interpreter),
            file_suffix: String::new(),
            scratch_dir: None,
            spawns: AtomicU64::new(0),
        }
    }

    /// Executor for Python harnesses.
    pub fn python() -> Self {
        Self::new("python3").with_file_suffix(".py")
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.interpreter.args = args;
        self
    }

    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Number of processes this executor has spawned.
    pub fn spawn_count(&self) -> u64 {
        self.spawns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceExecutor for LocalExecutor {
    async fn execute(&self, program: &str, timeout: Duration) -> ExecutionOutcome {
        let start = Instant::now();
        let scratch = match ScratchFile::create(
            self.scratch_dir.as_deref(),
            &self.file_suffix,
            program,
        ) {
            Ok(scratch) => scratch,
            Err(e) => return ExecutionOutcome::internal(format!("{e:#}"), start.elapsed()),
        };

        let outcome = executor::run(&self.interpreter, &scratch, timeout, start, || {
            self.spawns.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        match scratch.release() {
            Ok(()) => outcome,
            Err(_) if matches!(outcome.status, OutcomeStatus::InternalError { .. }) => outcome,
            Err(e) => ExecutionOutcome::internal(format!("{e:#}"), start.elapsed()),
        }
    }
}
