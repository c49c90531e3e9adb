//! Aggregate accounting for a run.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAX_FAILURE_SAMPLES;
use crate::execution::TestOutcome;

/// One retained failure, in the shape written to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSample {
    pub test: String,
    pub error: String,
}

/// Counts plus the first `sample_limit` failures of a run.
///
/// Fields serialize in snapshot order. `skipped` is part of the schema but
/// nothing increments it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    passed: usize,
    failed: usize,
    skipped: usize,
    total: usize,
    failures: Vec<FailureSample>,
    #[serde(skip, default = "default_sample_limit")]
    sample_limit: usize,
}

fn default_sample_limit() -> usize {
    DEFAULT_MAX_FAILURE_SAMPLES
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::with_sample_limit(DEFAULT_MAX_FAILURE_SAMPLES)
    }
}

impl ResultSet {
    pub fn with_sample_limit(sample_limit: usize) -> Self {
        Self {
            passed: 0,
            failed: 0,
            skipped: 0,
            total: 0,
            failures: Vec::new(),
            sample_limit,
        }
    }

    /// Folds a stream of outcomes into a fresh result set.
    pub fn from_outcomes<I>(outcomes: I, sample_limit: usize) -> Self
    where
        I: IntoIterator<Item = TestOutcome>,
    {
        outcomes
            .into_iter()
            .fold(Self::with_sample_limit(sample_limit), |mut results, outcome| {
                results.record(outcome);
                results
            })
    }

    /// Reads back a snapshot written by [`crate::report::render_snapshot`].
    pub fn from_snapshot(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Accounts for one outcome.
    ///
    /// Failures past the sample limit are counted but not kept, so the
    /// retained samples are always the earliest ones seen.
    pub fn record(&mut self, outcome: TestOutcome) {
        self.total += 1;
        if !outcome.verdict.is_failure() {
            self.passed += 1;
            return;
        }
        self.failed += 1;
        if self.failures.len() < self.sample_limit {
            self.failures.push(FailureSample {
                test: outcome.test,
                error: outcome.detail,
            });
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn failures(&self) -> &[FailureSample] {
        &self.failures
    }

    /// Percentage of tests that passed; 0 for an empty run.
    pub fn pass_rate(&self) -> f64 {
        Self::percentage(self.passed, self.total)
    }

    /// Percentage of tests that failed; 0 for an empty run.
    pub fn fail_rate(&self) -> f64 {
        Self::percentage(self.failed, self.total)
    }

    fn percentage(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            part as f64 / total as f64 * 100.0
        }
    }
}
