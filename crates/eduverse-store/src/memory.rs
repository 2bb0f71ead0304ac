//! In-memory stores.
//!
//! Used by the file-backed stores once data is loaded, and directly by tests
//! that want to count lookups.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use eduverse_core::model::{LearnerProfile, Scenario};
use eduverse_core::traits::{ProfileStore, ScenarioStore};

/// Scenarios keyed by week.
#[derive(Debug, Default)]
pub struct InMemoryScenarioStore {
    scenarios: HashMap<u32, Scenario>,
    lookups: AtomicU32,
}

impl InMemoryScenarioStore {
    /// Later scenarios replace earlier ones with the same week.
    pub fn new(scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        Self {
            scenarios: scenarios.into_iter().map(|s| (s.week, s)).collect(),
            lookups: AtomicU32::new(0),
        }
    }

    /// Weeks present, ascending.
    pub fn weeks(&self) -> Vec<u32> {
        let mut weeks: Vec<u32> = self.scenarios.keys().copied().collect();
        weeks.sort_unstable();
        weeks
    }

    pub fn get(&self, week: u32) -> Option<&Scenario> {
        self.scenarios.get(&week)
    }

    pub fn lookup_count(&self) -> u32 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ScenarioStore for InMemoryScenarioStore {
    async fn scenario(&self, week: u32) -> anyhow::Result<Option<Scenario>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.scenarios.get(&week).cloned())
    }
}

/// Learner profiles keyed by learner id.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: HashMap<String, LearnerProfile>,
    lookups: AtomicU32,
}

impl InMemoryProfileStore {
    pub fn new(profiles: impl IntoIterator<Item = LearnerProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.learner_id.clone(), p))
                .collect(),
            lookups: AtomicU32::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn lookup_count(&self) -> u32 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn profile(&self, learner_id: &str) -> anyhow::Result<Option<LearnerProfile>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.profiles.get(learner_id).cloned())
    }
}
