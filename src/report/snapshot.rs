use std::path::Path;

use super::write_report;
use crate::errors::HarnessError;
use crate::results::ResultSet;

/// Pretty JSON with `passed`, `failed`, `skipped`, `total` and every
/// retained failure.
pub fn render_snapshot(results: &ResultSet) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}

pub fn write_snapshot(path: &Path, results: &ResultSet) -> Result<(), HarnessError> {
    let json = render_snapshot(results)?;
    write_report(path, &json)
}
