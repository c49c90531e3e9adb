//! Command-line arguments for the harness.
//!
//! Uses the `clap` derive API. The `--swiftees` and `--test262-dir` aliases
//! keep older CI scripts working.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "conformance-harness",
    version,
    about = "Run a conformance corpus against an executable and report pass/fail statistics."
)]
pub struct HarnessArgs {
    /// Path to the executable under test.
    #[arg(long, visible_alias = "swiftees", value_name = "PATH")]
    pub target: PathBuf,

    /// Corpus checkout directory. Cloned if absent unless --no-fetch is set.
    #[arg(
        long,
        visible_alias = "test262-dir",
        value_name = "DIR",
        default_value = "test262"
    )]
    pub corpus_dir: PathBuf,

    /// Run at most this many tests.
    #[arg(long, value_name = "N")]
    pub max_tests: Option<usize>,

    /// Where to write the JSON results snapshot.
    #[arg(long, value_name = "PATH", default_value = "test262-results.json")]
    pub output: PathBuf,

    /// Where to write the markdown review summary.
    #[arg(long, value_name = "PATH")]
    pub pr_comment: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-test timeout in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Never clone the corpus; a missing directory means zero tests.
    #[arg(long)]
    pub no_fetch: bool,

    /// Disable coloured console output.
    #[arg(long)]
    pub no_color: bool,
}
