pub mod batch;
pub mod grade;
pub mod init;
pub mod show;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use eduverse_core::grader::GradingService;
use eduverse_runner::LocalExecutor;
use eduverse_store::{load_config_from, FileStores, GraderConfig};

/// Where grading data and settings come from.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Scenario file or directory (overrides the config)
    #[arg(long)]
    pub scenarios: Option<PathBuf>,

    /// Learner profile file (overrides the config)
    #[arg(long)]
    pub profiles: Option<PathBuf>,
}

impl DataArgs {
    /// Load the config and apply path overrides.
    pub fn load_config(&self) -> Result<GraderConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(scenarios) = &self.scenarios {
            config.scenarios_path = scenarios.clone();
        }
        if let Some(profiles) = &self.profiles {
            config.profiles_path = profiles.clone();
        }
        Ok(config)
    }
}

pub fn build_executor(config: &GraderConfig) -> LocalExecutor {
    let mut executor = LocalExecutor::new(config.interpreter.clone())
        .with_args(config.interpreter_args.clone())
        .with_file_suffix(config.file_suffix.clone());
    if let Some(dir) = &config.scratch_dir {
        executor = executor.with_scratch_dir(dir.clone());
    }
    executor
}

pub fn build_service(config: &GraderConfig) -> Result<GradingService> {
    let stores = FileStores::from_config(config)?;
    Ok(GradingService::new(
        stores.scenarios,
        stores.profiles,
        Arc::new(build_executor(config)),
        config.grading_config(),
    ))
}
