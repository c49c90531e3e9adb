//! User-facing console output for the CLI.
//!
//! Progress lines, the coloured results summary and status messages all go
//! through here so the library stays free of stdout writes.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::corpus::CorpusStatus;
use crate::harness::RunEvent;
use crate::report::{write_console, ReportContext};
use crate::results::ResultSet;

/// Progress is printed for the first test and then every this many.
const PROGRESS_EVERY: usize = 100;

pub struct ConsoleOutput {
    choice: ColorChoice,
}

impl ConsoleOutput {
    pub fn new(use_colors: bool) -> Self {
        let choice = if use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self { choice }
    }

    pub fn on_event(&self, event: RunEvent<'_>) {
        match event {
            RunEvent::CorpusReady(CorpusStatus::AlreadyPresent) => {}
            RunEvent::CorpusReady(CorpusStatus::Fetched) => {
                self.success("Successfully fetched corpus");
            }
            RunEvent::CorpusReady(CorpusStatus::Missing) => {}
            RunEvent::Discovered { count, notice } => {
                if let Some(notice) = notice {
                    self.failure(&notice.to_string());
                }
                if count == 0 {
                    self.failure("No test files found");
                } else {
                    println!("Found {} test files", count);
                    println!("\nRunning {} tests...\n", count);
                }
            }
            RunEvent::TestFinished { index, total, .. } => {
                if index == 1 || index % PROGRESS_EVERY == 0 {
                    println!("Progress: {}/{} tests...", index, total);
                }
            }
        }
    }

    pub fn results(&self, results: &ResultSet, ctx: &ReportContext) {
        let mut stdout = StandardStream::stdout(self.choice);
        let _ = write_console(&mut stdout, results, ctx);
    }

    pub fn success(&self, message: &str) {
        self.mark(Color::Green, "✓", message);
    }

    pub fn failure(&self, message: &str) {
        self.mark(Color::Red, "✗", message);
    }

    fn mark(&self, color: Color, mark: &str, message: &str) {
        let mut stdout = StandardStream::stdout(self.choice);
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(stdout, "{}", mark);
        let _ = stdout.reset();
        let _ = writeln!(stdout, " {}", message);
    }
}
