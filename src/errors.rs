//! Run-level errors for the harness.
//!
//! Failures local to a single test never show up here: the executor folds
//! them into a verdict. Everything in [`HarnessError`] aborts the run and
//! decides the process exit code.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for a completed run, whatever the test results were.
pub const EXIT_OK: i32 = 0;
/// Exit code for setup failures: corpus, configuration, report persistence.
pub const EXIT_SETUP: i32 = 1;
/// Exit code for a missing target executable.
pub const EXIT_PRECONDITION: i32 = 2;

#[derive(Error, Diagnostic, Debug)]
pub enum HarnessError {
    #[error("target executable not found: {}", path.display())]
    #[diagnostic(
        code(harness::precondition::target),
        help("build the executable under test first, then pass the path of the binary itself with --target")
    )]
    TargetNotFound { path: PathBuf },

    #[error("corpus unavailable at {}: {reason}", root.display())]
    #[diagnostic(
        code(harness::corpus::unavailable),
        help("check network access and that `git` is on PATH, or point --corpus-dir at an existing checkout")
    )]
    CorpusUnavailable { root: PathBuf, reason: String },

    #[error("failed to read config file {}", path.display())]
    #[diagnostic(code(harness::config::read))]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    #[diagnostic(
        code(harness::config::parse),
        help("recognised keys: suite_name, repository, test_subdir, extension, exclude_marker, not_executed_marker, timeout_secs (at least 1), max_failure_samples")
    )]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write report {}", path.display())]
    #[diagnostic(code(harness::report::write))]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize results")]
    #[diagnostic(code(harness::report::serialize))]
    Serialize(#[from] serde_json::Error),
}

impl HarnessError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::TargetNotFound { .. } => EXIT_PRECONDITION,
            _ => EXIT_SETUP,
        }
    }
}
