//! Compile-time registration of typed test cases.

use super::loader::{ModuleLoader, SourceFile};
use crate::case::{TestCase, TestClass};
use crewcheck_core::Result;
use std::path::Path;

/// Test classes registered under the source file that declares them.
///
/// A discovered file loads every class whose registered path ends with the
/// file's path relative to the discovery root.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: Vec<(String, TestClass)>,
}

impl StaticRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class under a source path
    pub fn register<P: Into<String>>(&mut self, source: P, class: TestClass) -> &mut Self {
        self.entries.push((source.into(), class));
        self
    }

    /// Register a typed test case under a source path
    pub fn register_case<T: TestCase>(&mut self, source: &str) -> &mut Self {
        self.register(source, TestClass::of::<T>())
    }

    /// Registered classes in registration order
    pub fn classes(&self) -> impl Iterator<Item = &TestClass> {
        self.entries.iter().map(|(_, class)| class)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ModuleLoader for StaticRegistry {
    fn load(&self, source: &SourceFile) -> Result<Vec<TestClass>> {
        let classes: Vec<TestClass> = self
            .entries
            .iter()
            .filter(|(registered, _)| Path::new(registered).ends_with(source.relative()))
            .map(|(_, class)| class.clone())
            .collect();

        if classes.is_empty() {
            tracing::debug!("No test cases registered for {:?}", source.relative());
        }

        Ok(classes)
    }
}

/// Register a test case under the file invoking the macro.
///
/// ```ignore
/// let mut registry = StaticRegistry::new();
/// register_case!(registry, ResearcherTests);
/// ```
#[macro_export]
macro_rules! register_case {
    ($registry:expr, $case:ty) => {
        $registry.register_case::<$case>(file!())
    };
}
