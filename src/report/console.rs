use std::io;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use super::ReportContext;
use crate::results::ResultSet;

/// Failure samples shown on the console.
pub const CONSOLE_FAILURE_LIMIT: usize = 10;
const BANNER_WIDTH: usize = 60;

/// Writes the console summary, colouring it when `out` supports colour.
pub fn write_console<W: WriteColor>(
    out: &mut W,
    results: &ResultSet,
    ctx: &ReportContext,
) -> io::Result<()> {
    let banner = "=".repeat(BANNER_WIDTH);

    writeln!(out)?;
    writeln!(out, "{}", banner)?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    writeln!(out, "{} RESULTS", ctx.suite_name.to_uppercase())?;
    out.reset()?;
    writeln!(out, "{}", banner)?;

    if results.total() == 0 {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(out, "✗ No tests were run")?;
        out.reset()?;
    }

    writeln!(out, "Total tests:   {}", results.total())?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(
        out,
        "Passed:        {} ({:.2}%)",
        results.passed(),
        results.pass_rate()
    )?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
    writeln!(
        out,
        "Failed:        {} ({:.2}%)",
        results.failed(),
        results.fail_rate()
    )?;
    out.reset()?;
    writeln!(out, "{}", banner)?;

    let failures = results.failures();
    if !failures.is_empty() {
        let shown = failures.len().min(CONSOLE_FAILURE_LIMIT);
        writeln!(out)?;
        writeln!(out, "First {} of {} recorded failures:", shown, failures.len())?;
        for failure in &failures[..shown] {
            writeln!(out, "  • {}", failure.test)?;
            if !failure.error.is_empty() {
                writeln!(out, "    Error: {}", failure.error)?;
            }
        }
    }

    writeln!(out)
}

/// The console summary as plain text.
pub fn render_console(results: &ResultSet, ctx: &ReportContext) -> String {
    let mut buffer = Buffer::no_color();
    // Writing into an in-memory buffer cannot fail.
    let _ = write_console(&mut buffer, results, ctx);
    String::from_utf8_lossy(buffer.as_slice()).into_owned()
}
