//! Read-only views of a finished [`ResultSet`](crate::results::ResultSet).
//!
//! Every view reads counts and rates from the same accessors, so the console,
//! the snapshot and the review summary cannot disagree. Rendering never
//! mutates the result set and gives identical output on every call.

mod console;
mod snapshot;
mod summary;

use std::fs;
use std::path::Path;

pub use console::{render_console, write_console, CONSOLE_FAILURE_LIMIT};
pub use snapshot::{render_snapshot, write_snapshot};
pub use summary::{render_summary, write_summary, SUMMARY_FAILURE_LIMIT};

use crate::errors::HarnessError;

/// Names used in report headings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// Suite name, e.g. "Test262".
    pub suite_name: String,
    /// Short name of the executable under test.
    pub target_name: String,
}

impl ReportContext {
    pub fn new(suite_name: impl Into<String>, target: &Path) -> Self {
        let target_name = target
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.display().to_string());
        Self {
            suite_name: suite_name.into(),
            target_name,
        }
    }
}

fn write_report(path: &Path, contents: &str) -> Result<(), HarnessError> {
    fs::write(path, contents).map_err(|source| HarnessError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}
