//! Scoped scratch storage for one execution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// File name (without suffix) of the program inside its scratch directory.
const PROGRAM_STEM: &str = "submission";

/// Environment variables blanked for learner processes.
const SCRUBBED_ENV: &[&str] = &[
    "SSH_AUTH_SOCK",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "GOOGLE_APPLICATION_CREDENTIALS",
    "GOOGLE_CLOUD_PROJECT",
    "FIREBASE_CONFIG",
    "FIREBASE_TOKEN",
    "FIRESTORE_EMULATOR_HOST",
    "GITHUB_TOKEN",
    "GH_TOKEN",
    "DATABASE_URL",
    "SECRET_KEY",
    "DOCKER_HOST",
    "KUBECONFIG",
];

/// A private directory holding one program.
///
/// The directory is the process's working directory, so anything the program
/// writes with a relative path stays inside it. The whole directory is
/// removed on drop; [`ScratchFile::release`] removes it explicitly and reports
/// failures.
pub struct ScratchFile {
    dir: TempDir,
    path: PathBuf,
}

impl ScratchFile {
    /// Create a fresh directory under `root` (or the system temp dir) and
    /// write `program` into it.
    pub fn create(root: Option<&Path>, suffix: &str, program: &str) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("submission-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context("failed to create scratch directory")?;

        let path = dir.path().join(format!("{PROGRAM_STEM}{suffix}"));
        std::fs::write(&path, program).context("failed to write scratch program")?;

        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The private directory the program runs in.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the directory and everything the program left in it.
    pub fn release(self) -> Result<()> {
        self.dir
            .close()
            .context("failed to remove scratch directory")
    }
}

/// Build environment variables for child processes.
///
/// Blanks credentials and keeps the interpreter from writing bytecode caches
/// next to the scratch file.
pub fn build_env() -> Vec<(String, String)> {
    let mut env = vec![
        ("PYTHONDONTWRITEBYTECODE".to_string(), "1".to_string()),
        ("PYTHONIOENCODING".to_string(), "utf-8".to_string()),
    ];

    for var in SCRUBBED_ENV {
        env.push((var.to_string(), String::new()));
    }

    env
}
