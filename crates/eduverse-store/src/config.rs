//! Grader configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use eduverse_core::grader::GradingConfig;

/// Top-level eduverse grader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Wall-clock bound for each run, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Interpreter used to run combined programs.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Extra arguments placed before the program path.
    #[serde(default)]
    pub interpreter_args: Vec<String>,
    /// Suffix given to scratch files.
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
    /// Directory for scratch files (system temp dir if unset).
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
    /// Scenario file or directory.
    #[serde(default = "default_scenarios_path")]
    pub scenarios_path: PathBuf,
    /// Learner profile file.
    #[serde(default = "default_profiles_path")]
    pub profiles_path: PathBuf,
    /// Max concurrent gradings in batch mode.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// JSON-lines file that graded submissions are appended to.
    #[serde(default)]
    pub submission_log: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    5
}
fn default_interpreter() -> String {
    "python3".to_string()
}
fn default_file_suffix() -> String {
    ".py".to_string()
}
fn default_scenarios_path() -> PathBuf {
    PathBuf::from("scenarios")
}
fn default_profiles_path() -> PathBuf {
    PathBuf::from("profiles.json")
}
fn default_parallelism() -> usize {
    4
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            interpreter: default_interpreter(),
            interpreter_args: Vec::new(),
            file_suffix: default_file_suffix(),
            scratch_dir: None,
            scenarios_path: default_scenarios_path(),
            profiles_path: default_profiles_path(),
            parallelism: default_parallelism(),
            submission_log: None,
        }
    }
}

impl GraderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn grading_config(&self) -> GradingConfig {
        GradingConfig {
            timeout: self.timeout(),
            parallelism: self.parallelism,
        }
    }

    /// Reject values the grader cannot run with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.timeout_secs > 0, "timeout_secs must be at least 1");
        anyhow::ensure!(self.parallelism >= 1, "parallelism must be at least 1");
        anyhow::ensure!(
            !self.interpreter.trim().is_empty(),
            "interpreter must not be empty"
        );
        Ok(())
    }

    fn resolve_env(&mut self) {
        self.interpreter = resolve_env_vars(&self.interpreter);
        self.interpreter_args = self
            .interpreter_args
            .iter()
            .map(|a| resolve_env_vars(a))
            .collect();
        self.scratch_dir = self.scratch_dir.as_deref().map(resolve_path);
        self.scenarios_path = resolve_path(&self.scenarios_path);
        self.profiles_path = resolve_path(&self.profiles_path);
        self.submission_log = self.submission_log.as_deref().map(resolve_path);
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `eduverse.toml` in the current directory
/// 2. `~/.config/eduverse/config.toml`
///
/// Environment variable overrides: `EDUVERSE_TIMEOUT_SECS`, `EDUVERSE_INTERPRETER`.
pub fn load_config() -> Result<GraderConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GraderConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("eduverse.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GraderConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GraderConfig::default(),
    };

    if let Ok(secs) = std::env::var("EDUVERSE_TIMEOUT_SECS") {
        config.timeout_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("invalid EDUVERSE_TIMEOUT_SECS: '{secs}'"))?;
    }
    if let Ok(interpreter) = std::env::var("EDUVERSE_INTERPRETER") {
        config.interpreter = interpreter;
    }

    config.resolve_env();
    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("eduverse"))
}
