//! The `eduverse-grade grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use eduverse_core::log::SubmissionLogRecord;
use eduverse_core::model::SubmissionRequest;

use super::{build_service, DataArgs};

pub async fn execute(
    week: u32,
    cycle: usize,
    learner: String,
    source_path: PathBuf,
    timeout: Option<u64>,
    log: Option<PathBuf>,
    data: DataArgs,
) -> Result<()> {
    let mut config = data.load_config()?;
    if let Some(secs) = timeout {
        anyhow::ensure!(secs >= 1, "timeout must be at least 1 second");
        config.timeout_secs = secs;
    }

    let source = std::fs::read_to_string(&source_path)
        .with_context(|| format!("failed to read source: {}", source_path.display()))?;
    let service = build_service(&config)?;

    let request = SubmissionRequest {
        learner_id: learner,
        week,
        cycle,
        source,
    };
    let report = service.grade(&request).await?;

    if let Some(path) = log.or(config.submission_log) {
        SubmissionLogRecord::from_report(&report).append_jsonl(&path)?;
    }

    println!("{}", serde_json::to_string_pretty(&report.verdict)?);
    Ok(())
}
