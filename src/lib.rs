//! Conformance-test harness.
//!
//! Discovers a corpus of standalone test files, runs each one through a
//! target executable with a per-test timeout, classifies the run from its
//! output and exit status, and reports the totals as console text, a JSON
//! snapshot and a short markdown summary.

pub use crate::errors::HarnessError;

pub mod cli;
pub mod config;
pub mod corpus;
pub mod discovery;
pub mod errors;
pub mod execution;
pub mod harness;
pub mod report;
pub mod results;
