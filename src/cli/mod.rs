//! The harness command-line interface.
//!
//! Parses arguments, wires the pipeline together and maps run-level errors
//! to exit codes. A completed run exits 0 even when tests failed.

use crate::cli::args::HarnessArgs;
use crate::cli::output::ConsoleOutput;
use crate::config::HarnessConfig;
use crate::corpus::{CorpusProvider, GitCorpus, LocalCorpus};
use crate::errors::{HarnessError, EXIT_OK};
use crate::harness::{ensure_target, Harness};
use crate::report::{write_snapshot, write_summary, ReportContext};
use clap::Parser;
use std::process;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = HarnessArgs::parse();

    let code = match execute(&args) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            code
        }
    };
    process::exit(code);
}

fn load_config(args: &HarnessArgs) -> Result<HarnessConfig, HarnessError> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if args.no_color {
        config.use_colors = false;
    }
    Ok(config)
}

fn execute(args: &HarnessArgs) -> Result<(), HarnessError> {
    // Checked before anything touches the corpus.
    ensure_target(&args.target)?;
    let config = load_config(args)?;
    let output = ConsoleOutput::new(config.use_colors);

    let provider: Box<dyn CorpusProvider> = if args.no_fetch {
        Box::new(LocalCorpus)
    } else {
        if !args.corpus_dir.exists() {
            println!(
                "Cloning {} into {}...",
                config.repository,
                args.corpus_dir.display()
            );
        }
        Box::new(GitCorpus::new(config.repository.clone()))
    };

    let harness = Harness::new(&args.target, &config).with_max_tests(args.max_tests);
    let report = harness.run(&args.corpus_dir, provider.as_ref(), &mut |event| {
        output.on_event(event)
    })?;

    let ctx = ReportContext::new(config.suite_name.clone(), &args.target);
    output.results(&report.results, &ctx);

    write_snapshot(&args.output, &report.results)?;
    output.success(&format!("Results saved to {}", args.output.display()));

    if let Some(path) = &args.pr_comment {
        write_summary(path, &report.results, &ctx)?;
        output.success(&format!("PR comment saved to {}", path.display()));
    }

    Ok(())
}
