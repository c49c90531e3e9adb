//! Harness configuration.
//!
//! Defaults describe a Test262 run. A YAML file may override any key, and
//! command-line flags override the file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::errors::HarnessError;

const DEFAULT_SUITE_NAME: &str = "Test262";
const DEFAULT_REPOSITORY: &str = "https://github.com/tc39/test262.git";
const DEFAULT_TEST_SUBDIR: &str = "test";
const DEFAULT_EXTENSION: &str = "js";
const DEFAULT_EXCLUDE_MARKER: &str = "_FIXTURES";
const DEFAULT_NOT_EXECUTED_MARKER: &str = "Swiftees: Loaded file";
const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// Number of failing outcomes retained for reporting.
pub const DEFAULT_MAX_FAILURE_SAMPLES: usize = 50;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub suite_name: String,
    pub repository: String,
    pub test_subdir: String,
    pub extension: String,
    pub exclude_marker: String,
    pub not_executed_marker: String,
    #[serde(deserialize_with = "positive_secs")]
    pub timeout_secs: u64,
    pub max_failure_samples: usize,
    #[serde(skip)]
    pub use_colors: bool,
}

/// A zero timeout would time out every test before it starts.
fn positive_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    if secs == 0 {
        return Err(de::Error::custom("timeout_secs must be at least 1"));
    }
    Ok(secs)
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            suite_name: DEFAULT_SUITE_NAME.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            test_subdir: DEFAULT_TEST_SUBDIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            exclude_marker: DEFAULT_EXCLUDE_MARKER.to_string(),
            not_executed_marker: DEFAULT_NOT_EXECUTED_MARKER.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_failure_samples: DEFAULT_MAX_FAILURE_SAMPLES,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl HarnessConfig {
    /// Reads a YAML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let content = fs::read_to_string(path).map_err(|source| HarnessError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn discovery_rules(&self) -> DiscoveryRules {
        DiscoveryRules {
            test_subdir: self.test_subdir.clone(),
            extension: self.extension.clone(),
            exclude_marker: self.exclude_marker.clone(),
        }
    }

    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            not_executed_marker: self.not_executed_marker.clone(),
        }
    }
}

/// Which files under the corpus count as tests.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRules {
    /// Directory below the corpus root that holds the tests.
    pub test_subdir: String,
    pub extension: String,
    /// Paths containing this string are support files.
    pub exclude_marker: String,
}

impl Default for DiscoveryRules {
    fn default() -> Self {
        HarnessConfig::default().discovery_rules()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub timeout: Duration,
    /// Printed by a target that read the file but did not run it.
    pub not_executed_marker: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        HarnessConfig::default().execution()
    }
}
