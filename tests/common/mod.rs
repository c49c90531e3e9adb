//! Shared fixtures for the harness integration tests.
//!
//! Corpora are built in temporary directories. Test files are tiny shell
//! scripts and the target is `/bin/sh`, so `<target> <file>` runs them
//! without writing any executables.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use conformance_harness::config::{ExecutionConfig, HarnessConfig};
use tempfile::TempDir;

pub const SHELL: &str = "/bin/sh";

pub const PASSING: &str = "exit 0\n";
pub const NOT_EXECUTED: &str = "echo \"Swiftees: Loaded file '$0'\"\necho 'Swiftees: File size: 12 bytes'\nexit 0\n";
pub const SYNTAX_ERROR: &str = "echo 'SyntaxError: x' >&2\nexit 2\n";
pub const HANGS: &str = "sleep 30\n";

/// A temporary corpus with a `test/` directory.
pub struct Corpus {
    pub dir: TempDir,
}

impl Corpus {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp corpus");
        fs::create_dir_all(dir.path().join("test")).expect("create test dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `contents` at `relative` below the corpus root.
    pub fn add(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write test file");
        path
    }
}

pub fn fast_execution(timeout: Duration) -> ExecutionConfig {
    ExecutionConfig {
        timeout,
        ..ExecutionConfig::default()
    }
}

pub fn config_with_timeout(timeout_secs: u64) -> HarnessConfig {
    HarnessConfig {
        timeout_secs,
        use_colors: false,
        ..HarnessConfig::default()
    }
}
