use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::DiscoveryRules;

/// A single test file, identified by its path relative to the corpus root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Corpus-relative path with `/` separators. Used in every report.
    pub id: String,
    /// Path handed to the target executable.
    pub path: PathBuf,
}

/// Something the caller should know about even though discovery succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryNotice {
    MissingRoot(PathBuf),
}

impl std::fmt::Display for DiscoveryNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryNotice::MissingRoot(path) => {
                write!(f, "Test directory not found: {}", path.display())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub cases: Vec<TestCase>,
    pub notice: Option<DiscoveryNotice>,
}

/// Discovers test files beneath a corpus.
#[derive(Debug)]
pub struct TestDiscoverer;

impl TestDiscoverer {
    /// Walks `corpus_root/<test_subdir>` for test files.
    ///
    /// Files come back in traversal order, which is stable for a given
    /// filesystem but not sorted. With `max_tests` only the first `n` are
    /// kept. A missing test directory yields no cases and a notice.
    pub fn discover(
        corpus_root: &Path,
        rules: &DiscoveryRules,
        max_tests: Option<usize>,
    ) -> Discovery {
        let search_root = corpus_root.join(&rules.test_subdir);
        if !search_root.is_dir() {
            return Discovery {
                cases: Vec::new(),
                notice: Some(DiscoveryNotice::MissingRoot(search_root)),
            };
        }

        let limit = max_tests.unwrap_or(usize::MAX);
        let mut cases = Vec::new();
        for entry in WalkDir::new(&search_root) {
            if cases.len() >= limit {
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable corpus entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !Self::is_test_file(path, rules) {
                continue;
            }
            cases.push(TestCase {
                id: Self::relative_id(corpus_root, path),
                path: path.to_path_buf(),
            });
        }

        Discovery {
            cases,
            notice: None,
        }
    }

    fn is_test_file(path: &Path, rules: &DiscoveryRules) -> bool {
        let has_extension = path
            .extension()
            .is_some_and(|ext| ext == rules.extension.as_str());
        let excluded = !rules.exclude_marker.is_empty()
            && path.to_string_lossy().contains(&rules.exclude_marker);
        has_extension && !excluded
    }

    fn relative_id(corpus_root: &Path, path: &Path) -> String {
        let relative = path.strip_prefix(corpus_root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
