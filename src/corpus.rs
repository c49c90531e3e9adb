//! Making a corpus available on disk before discovery runs.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::errors::HarnessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusStatus {
    /// The directory was already there.
    AlreadyPresent,
    /// The provider fetched it during this call.
    Fetched,
    /// Not there and the provider does not fetch. The run continues empty.
    Missing,
}

/// Ensures a corpus directory exists.
pub trait CorpusProvider {
    fn ensure_corpus(&self, root: &Path) -> Result<CorpusStatus, HarnessError>;
}

/// Shallow-clones a git repository when the corpus root is absent.
#[derive(Debug, Clone)]
pub struct GitCorpus {
    repository: String,
    git: PathBuf,
}

impl GitCorpus {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            git: PathBuf::from("git"),
        }
    }

    /// Uses a specific `git` binary instead of the one on `PATH`.
    pub fn with_git(mut self, git: impl Into<PathBuf>) -> Self {
        self.git = git.into();
        self
    }
}

impl CorpusProvider for GitCorpus {
    fn ensure_corpus(&self, root: &Path) -> Result<CorpusStatus, HarnessError> {
        if root.exists() {
            return Ok(CorpusStatus::AlreadyPresent);
        }

        info!(repository = %self.repository, root = %root.display(), "cloning corpus");
        let output = Command::new(&self.git)
            .args(["clone", "--depth", "1"])
            .arg(&self.repository)
            .arg(root)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| HarnessError::CorpusUnavailable {
                root: root.to_path_buf(),
                reason: format!("could not run {}: {}", self.git.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HarnessError::CorpusUnavailable {
                root: root.to_path_buf(),
                reason: format!("git clone failed ({}): {}", output.status, stderr.trim()),
            });
        }
        Ok(CorpusStatus::Fetched)
    }
}

/// Uses whatever is already on disk and never fetches.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCorpus;

impl CorpusProvider for LocalCorpus {
    fn ensure_corpus(&self, root: &Path) -> Result<CorpusStatus, HarnessError> {
        if root.exists() {
            Ok(CorpusStatus::AlreadyPresent)
        } else {
            Ok(CorpusStatus::Missing)
        }
    }
}
