//! Caller-owned loading context handed to discovery.

use crate::case::TestClass;
use crewcheck_core::Result;
use std::path::{Path, PathBuf};

/// A candidate test module found while walking the test directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as found on disk
    path: PathBuf,
    /// Path relative to the discovery root
    relative: PathBuf,
}

impl SourceFile {
    /// Describe a module found under `root`
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative = path
            .strip_prefix(root)
            .map_or_else(|_| path.clone(), Path::to_path_buf);
        Self { path, relative }
    }

    /// Path as found on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the discovery root
    pub fn relative(&self) -> &Path {
        &self.relative
    }
}

/// Turns a candidate module into the test classes it declares.
///
/// Loaders own whatever state loading needs; discovery never keeps any of
/// it once the pass is over.
pub trait ModuleLoader {
    /// Load the classes declared by a module
    ///
    /// # Errors
    /// Returns an error if the module cannot be read or parsed; discovery
    /// skips the module and carries on
    fn load(&self, source: &SourceFile) -> Result<Vec<TestClass>>;
}
