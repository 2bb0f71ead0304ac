//! Stores loaded from JSON files on disk.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use eduverse_core::model::LearnerProfile;
use eduverse_core::parser::load_scenarios;

use crate::config::GraderConfig;
use crate::memory::{InMemoryProfileStore, InMemoryScenarioStore};

/// Scenario and profile stores read once at startup.
#[derive(Debug, Clone)]
pub struct FileStores {
    pub scenarios: Arc<InMemoryScenarioStore>,
    pub profiles: Arc<InMemoryProfileStore>,
}

impl FileStores {
    /// Load scenarios from a file or directory and profiles from a JSON array.
    pub fn load(scenarios_path: &Path, profiles_path: &Path) -> Result<Self> {
        let scenarios = load_scenarios(scenarios_path)?;
        let profiles = load_profiles(profiles_path)?;
        tracing::info!(
            scenarios = scenarios.len(),
            profiles = profiles.len(),
            "loaded grading data"
        );
        Ok(Self {
            scenarios: Arc::new(InMemoryScenarioStore::new(scenarios)),
            profiles: Arc::new(InMemoryProfileStore::new(profiles)),
        })
    }

    pub fn from_config(config: &GraderConfig) -> Result<Self> {
        Self::load(&config.scenarios_path, &config.profiles_path)
    }
}

/// Read learner profiles from a JSON array.
pub fn load_profiles(path: &Path) -> Result<Vec<LearnerProfile>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profiles: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse profiles: {}", path.display()))
}
