//! The run pipeline: corpus, discovery, execution, aggregation.
//!
//! Stages only pass values downstream. The [`ResultSet`] is created here,
//! folded one outcome at a time, and handed back finished.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{DiscoveryRules, HarnessConfig};
use crate::corpus::{CorpusProvider, CorpusStatus};
use crate::discovery::{DiscoveryNotice, TestCase, TestDiscoverer};
use crate::errors::HarnessError;
use crate::execution::{Executor, TestOutcome};
use crate::results::ResultSet;

/// Progress notifications for whoever drives the run.
#[derive(Debug)]
pub enum RunEvent<'a> {
    CorpusReady(CorpusStatus),
    Discovered {
        count: usize,
        notice: Option<&'a DiscoveryNotice>,
    },
    TestFinished {
        /// 1-based position in discovery order.
        index: usize,
        total: usize,
        outcome: &'a TestOutcome,
    },
}

/// A finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub corpus: CorpusStatus,
    pub notice: Option<DiscoveryNotice>,
    pub results: ResultSet,
}

/// Fails unless the target is an existing file. A directory would only fail
/// later, once per test, at spawn time.
pub fn ensure_target(target: &Path) -> Result<(), HarnessError> {
    if target.is_file() {
        Ok(())
    } else {
        Err(HarnessError::TargetNotFound {
            path: target.to_path_buf(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Harness {
    executor: Executor,
    rules: DiscoveryRules,
    max_tests: Option<usize>,
    sample_limit: usize,
}

impl Harness {
    pub fn new(target: impl Into<PathBuf>, config: &HarnessConfig) -> Self {
        Self {
            executor: Executor::new(target, config.execution()),
            rules: config.discovery_rules(),
            max_tests: None,
            sample_limit: config.max_failure_samples,
        }
    }

    pub fn with_max_tests(mut self, max_tests: Option<usize>) -> Self {
        self.max_tests = max_tests;
        self
    }

    /// Runs the whole pipeline against `corpus_root`.
    ///
    /// Only a provider failure is an error. A missing test directory gives
    /// an empty result set plus a notice.
    pub fn run(
        &self,
        corpus_root: &Path,
        provider: &dyn CorpusProvider,
        observer: &mut dyn FnMut(RunEvent<'_>),
    ) -> Result<RunReport, HarnessError> {
        let corpus = provider.ensure_corpus(corpus_root)?;
        info!(root = %corpus_root.display(), status = ?corpus, "corpus ready");
        observer(RunEvent::CorpusReady(corpus));

        let discovery = TestDiscoverer::discover(corpus_root, &self.rules, self.max_tests);
        if let Some(notice) = &discovery.notice {
            warn!("{}", notice);
        }
        info!(count = discovery.cases.len(), "discovered tests");
        observer(RunEvent::Discovered {
            count: discovery.cases.len(),
            notice: discovery.notice.as_ref(),
        });

        let results = self.run_cases(discovery.cases, observer);
        Ok(RunReport {
            corpus,
            notice: discovery.notice,
            results,
        })
    }

    /// Executes cases in order and folds every outcome into a new result set.
    pub fn run_cases(
        &self,
        cases: Vec<TestCase>,
        observer: &mut dyn FnMut(RunEvent<'_>),
    ) -> ResultSet {
        let total = cases.len();
        let mut results = ResultSet::with_sample_limit(self.sample_limit);
        for (i, case) in cases.into_iter().enumerate() {
            let outcome = self.executor.run(&case);
            observer(RunEvent::TestFinished {
                index: i + 1,
                total,
                outcome: &outcome,
            });
            results.record(outcome);
        }
        results
    }
}
