//! eduverse-store: read-only scenario and profile stores, plus configuration.

pub mod config;
pub mod file;
pub mod memory;

pub use config::{load_config, load_config_from, GraderConfig};
pub use file::{load_profiles, FileStores};
pub use memory::{InMemoryProfileStore, InMemoryScenarioStore};
