use std::fmt::Write;
use std::path::Path;

use super::{write_report, ReportContext};
use crate::errors::HarnessError;
use crate::results::ResultSet;

/// Failure identities listed in the review summary.
pub const SUMMARY_FAILURE_LIMIT: usize = 5;

fn band_marker(pass_rate: f64) -> &'static str {
    if pass_rate >= 90.0 {
        "🎉"
    } else if pass_rate >= 50.0 {
        "📊"
    } else {
        "🔧"
    }
}

/// Short markdown summary for review comments.
pub fn render_summary(results: &ResultSet, ctx: &ReportContext) -> String {
    let pass_rate = results.pass_rate();
    let mut md = String::new();

    // Writing to a String never fails.
    if results.total() == 0 {
        let _ = writeln!(md, "## ⚠️ {} Results", ctx.suite_name);
        let _ = writeln!(md);
        let _ = writeln!(md, "No tests were run.");
    } else {
        let _ = writeln!(md, "## {} {} Results", band_marker(pass_rate), ctx.suite_name);
    }

    let _ = writeln!(md);
    let _ = writeln!(md, "| Metric | Value |");
    let _ = writeln!(md, "|--------|-------|");
    let _ = writeln!(md, "| **Total Tests** | {} |", results.total());
    let _ = writeln!(md, "| **Passed** | {} ({:.2}%) |", results.passed(), pass_rate);
    let _ = writeln!(
        md,
        "| **Failed** | {} ({:.2}%) |",
        results.failed(),
        results.fail_rate()
    );

    if pass_rate < 100.0 && !results.failures().is_empty() {
        let _ = writeln!(md);
        let _ = writeln!(md, "### Sample Failures (first {})", SUMMARY_FAILURE_LIMIT);
        let _ = writeln!(md);
        for failure in results.failures().iter().take(SUMMARY_FAILURE_LIMIT) {
            let _ = writeln!(md, "- `{}`", failure.test);
        }
    }

    let _ = writeln!(md);
    let _ = writeln!(md, "---");
    let _ = write!(
        md,
        "*This test suite is expected to have failures as {} is under active development.*",
        ctx.target_name
    );
    md
}

pub fn write_summary(
    path: &Path,
    results: &ResultSet,
    ctx: &ReportContext,
) -> Result<(), HarnessError> {
    write_report(path, &render_summary(results, ctx))
}
