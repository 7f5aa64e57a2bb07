//! Runner configuration: where to look for tests and how to report them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "crewcheck.toml";
/// Default directory scanned for test modules.
pub const DEFAULT_TEST_DIR: &str = "tests";
/// Default file name pattern for test modules.
pub const DEFAULT_PATTERN: &str = "test_*.json";
/// Prefix a method name needs to be collected as a test.
pub const DEFAULT_METHOD_PREFIX: &str = "test_";
/// Default HTML report path.
pub const DEFAULT_REPORT_FILE: &str = "crewcheck_test_report.html";
/// Highest supported verbosity level.
pub const MAX_VERBOSITY: u8 = 2;

/// Complete runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory containing test modules
    pub test_dir: PathBuf,
    /// Glob matched against test module file names
    pub pattern: String,
    /// Prefix of methods collected as tests
    pub method_prefix: String,
    /// Output verbosity (0-2)
    pub verbosity: u8,
    /// Whether to write an HTML report
    pub report: bool,
    /// Where the HTML report is written
    pub report_file: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            test_dir: PathBuf::from(DEFAULT_TEST_DIR),
            pattern: DEFAULT_PATTERN.to_owned(),
            method_prefix: DEFAULT_METHOD_PREFIX.to_owned(),
            verbosity: MAX_VERBOSITY,
            report: false,
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from an explicit path, or from `crewcheck.toml` in
    /// the working directory when it exists, or fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if an explicit path is missing, or if an existing
    /// file cannot be read or parsed
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            ))),
            Some(path) => Self::load_from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.verbosity = config.verbosity.min(MAX_VERBOSITY);

        tracing::debug!(
            "Loaded config from {:?}: test_dir={:?}, pattern={}",
            path,
            config.test_dir,
            config.pattern
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Set verbosity, clamped to the supported range
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity.min(MAX_VERBOSITY);
        self
    }
}
