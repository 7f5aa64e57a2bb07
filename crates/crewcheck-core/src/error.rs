use core::result::Result as CoreResult;
use std::io::Error as IoError;

use glob::PatternError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;
use toml::ser::Error as TomlSerError;
use walkdir::Error as WalkDirError;

/// Result type for crewcheck operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur outside of assertion checks.
///
/// Assertion failures are deliberately not part of this enum; they are
/// reported through `AssertionViolation` in `crewcheck-assert` so the runner
/// can keep "expectation unmet" apart from "crashed".
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// TOML serialization failed.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] TomlSerError),

    /// A file name pattern failed to compile.
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] PatternError),

    /// Walking the test directory failed.
    #[error("Directory traversal failed: {0}")]
    Walk(#[from] WalkDirError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A test module could not be loaded.
    #[error("Failed to load {path}: {reason}")]
    Load {
        /// Path of the module that failed to load
        path: String,
        /// Why loading failed
        reason: String,
    },

    /// Test scaffolding was used before it was set up.
    #[error("Invalid test setup: {0}")]
    Setup(String),

    /// A named agent, tool or task could not be found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A quality evaluator failed to produce a score.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a load error for the given path.
    pub fn load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
