//! Locating test units and binding them into a suite.

mod fixture;
mod fixture_loader;
mod loader;
mod registry;

pub use fixture::{AssertStep, Check, FixtureClass, FixtureKind, FixtureModule, FixtureStep, FixtureTest};
pub use fixture_loader::FixtureLoader;
pub use loader::{ModuleLoader, SourceFile};
pub use registry::StaticRegistry;

use crate::case::{Category, TestClass};
use crewcheck_core::{Result, RunnerConfig};
use glob::Pattern;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::slice::Iter;
use walkdir::WalkDir;

/// An executable test: one method of one class.
#[derive(Debug, Clone)]
pub struct TestUnit {
    /// Owning class
    class: TestClass,
    /// Method to run
    method: String,
}

impl TestUnit {
    /// Bind a method of a class
    pub fn new<T: Into<String>>(class: TestClass, method: T) -> Self {
        Self {
            class,
            method: method.into(),
        }
    }

    /// Identifier in the form `Class.method`
    pub fn id(&self) -> String {
        format!("{}.{}", self.class.name(), self.method)
    }

    /// Owning class
    pub fn class(&self) -> &TestClass {
        &self.class
    }

    /// Method name
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Category of the owning class
    pub fn category(&self) -> Category {
        self.class.category()
    }
}

impl fmt::Display for TestUnit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}", self.class.name(), self.method)
    }
}

/// A module that could not be loaded and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFault {
    /// Module path
    pub path: PathBuf,
    /// Why loading failed
    pub reason: String,
}

/// Ordered collection of test units, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    units: Vec<TestUnit>,
    load_faults: Vec<LoadFault>,
}

impl TestSuite {
    /// Create an empty suite
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit
    pub fn push(&mut self, unit: TestUnit) {
        self.units.push(unit);
    }

    /// Append one unit per method of `class` starting with `prefix`
    pub fn add_class(&mut self, class: &TestClass, prefix: &str) -> usize {
        let before = self.units.len();
        for method in class.methods().iter().filter(|method| method.starts_with(prefix)) {
            self.units.push(TestUnit::new(class.clone(), method.clone()));
        }
        self.units.len() - before
    }

    /// Units in order
    pub fn units(&self) -> &[TestUnit] {
        &self.units
    }

    /// Iterate over the units
    pub fn iter(&self) -> impl Iterator<Item = &TestUnit> {
        self.units.iter()
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the suite holds no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Modules skipped during discovery
    pub fn load_faults(&self) -> &[LoadFault] {
        &self.load_faults
    }
}

impl<'suite> IntoIterator for &'suite TestSuite {
    type Item = &'suite TestUnit;
    type IntoIter = Iter<'suite, TestUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Walks a directory and collects test units through a [`ModuleLoader`].
pub struct Discoverer<'loader> {
    /// Loading context owned by the caller
    loader: &'loader dyn ModuleLoader,
    /// File name pattern of test modules
    pattern: Pattern,
    /// Prefix of test methods
    method_prefix: String,
}

impl<'loader> Discoverer<'loader> {
    /// Create a discoverer
    ///
    /// # Errors
    /// Returns an error if `pattern` is not a valid glob
    pub fn new(loader: &'loader dyn ModuleLoader, pattern: &str, method_prefix: &str) -> Result<Self> {
        Ok(Self {
            loader,
            pattern: Pattern::new(pattern)?,
            method_prefix: method_prefix.to_owned(),
        })
    }

    /// Create a discoverer using the configured pattern and method prefix
    ///
    /// # Errors
    /// Returns an error if the configured pattern is not a valid glob
    pub fn from_config(loader: &'loader dyn ModuleLoader, config: &RunnerConfig) -> Result<Self> {
        Self::new(loader, &config.pattern, &config.method_prefix)
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.pattern.matches(name))
    }

    /// Collect every test unit under `root`.
    ///
    /// Files are visited in lexicographic order and each one is loaded at
    /// most once. A file that fails to load is recorded as a [`LoadFault`]
    /// and skipped. A missing root yields an empty suite.
    ///
    /// # Errors
    /// Returns an error if the root directory itself cannot be read
    pub fn discover(&self, root: &Path) -> Result<TestSuite> {
        let mut suite = TestSuite::new();

        if !root.is_dir() {
            tracing::debug!("Test directory {:?} does not exist", root);
            return Ok(suite);
        }

        let mut seen = BTreeSet::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) if error.depth() == 0 => return Err(error.into()),
                Err(error) => {
                    let path = error.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                    tracing::warn!("Skipping {:?}: {error}", path);
                    suite.load_faults.push(LoadFault {
                        path,
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.matches(entry.path()) {
                continue;
            }

            let path = entry.into_path();
            let canonical = canonical_path(&path);
            if !seen.insert(canonical) {
                continue;
            }

            self.load_file(&mut suite, SourceFile::new(root, path));
        }

        tracing::debug!(
            "Discovered {} test(s) in {} file(s)",
            suite.len(),
            seen.len()
        );

        Ok(suite)
    }

    fn load_file(&self, suite: &mut TestSuite, source: SourceFile) {
        let classes = match self.loader.load(&source) {
            Ok(classes) => classes,
            Err(error) => {
                tracing::warn!("Could not load {:?}: {error}", source.path());
                suite.load_faults.push(LoadFault {
                    path: source.path().to_path_buf(),
                    reason: error.to_string(),
                });
                return;
            }
        };

        for class in &classes {
            if class.category() == Category::Other {
                tracing::debug!("Skipping {}: not an agent or crew test", class.name());
                continue;
            }
            let added = suite.add_class(class, &self.method_prefix);
            tracing::debug!("Loaded {} test(s) from {}", added, class.name());
        }
    }
}

impl fmt::Debug for Discoverer<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Discoverer")
            .field("pattern", &self.pattern.as_str())
            .field("method_prefix", &self.method_prefix)
            .finish_non_exhaustive()
    }
}

/// Canonical form of a path used to load each file once; falls back to the
/// path itself when it cannot be resolved.
fn canonical_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|error| {
        tracing::debug!("Cannot canonicalize {path:?}, deduplicating by path: {error}");
        path.to_path_buf()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{AgentTestCase, CrewTestCase};
    use crate::case::{TestCase, TestMethod, TestResult};
    use crate::test_methods;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Default)]
    struct SummaryTests {
        base: AgentTestCase,
    }

    impl SummaryTests {
        fn test_short(&mut self) -> TestResult {
            Ok(())
        }

        fn test_long(&mut self) -> TestResult {
            Ok(())
        }

        fn helper(&mut self) -> TestResult {
            Ok(())
        }
    }

    impl TestCase for SummaryTests {
        type Base = AgentTestCase;

        fn base(&mut self) -> &mut AgentTestCase {
            &mut self.base
        }

        fn test_methods() -> Vec<TestMethod<Self>> {
            test_methods![test_short, test_long, helper]
        }
    }

    #[derive(Default)]
    struct PipelineTests {
        base: CrewTestCase,
    }

    impl PipelineTests {
        fn test_pipeline(&mut self) -> TestResult {
            Ok(())
        }
    }

    impl TestCase for PipelineTests {
        type Base = CrewTestCase;

        fn base(&mut self) -> &mut CrewTestCase {
            &mut self.base
        }

        fn test_methods() -> Vec<TestMethod<Self>> {
            test_methods![test_pipeline]
        }
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    fn registry() -> StaticRegistry {
        let mut registry = StaticRegistry::new();
        registry
            .register_case::<SummaryTests>("tests/test_summary.json")
            .register_case::<PipelineTests>("tests/crew/test_pipeline.json");
        registry
    }

    #[test]
    fn test_empty_directory_yields_empty_suite() {
        let temp = TempDir::new().unwrap();
        let registry = registry();
        let discoverer = Discoverer::new(&registry, "test_*.json", "test_").unwrap();
        let suite = discoverer.discover(temp.path()).unwrap();
        assert!(suite.is_empty());
        assert!(suite.load_faults().is_empty());
    }

    #[test]
    fn test_missing_directory_yields_empty_suite() {
        let temp = TempDir::new().unwrap();
        let registry = registry();
        let discoverer = Discoverer::new(&registry, "test_*.json", "test_").unwrap();
        assert!(discoverer.discover(&temp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_discovers_prefixed_methods_in_order() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "test_summary.json");
        touch(temp.path(), "crew/test_pipeline.json");
        touch(temp.path(), "helpers.json");

        let registry = registry();
        let discoverer = Discoverer::new(&registry, "test_*.json", "test_").unwrap();
        let suite = discoverer.discover(temp.path()).unwrap();

        let ids: Vec<String> = suite.iter().map(TestUnit::id).collect();
        assert_eq!(
            ids,
            vec![
                "PipelineTests.test_pipeline",
                "SummaryTests.test_short",
                "SummaryTests.test_long",
            ]
        );
        assert_eq!(suite.units()[0].category(), Category::CrewTest);
        assert_eq!(suite.units()[1].category(), Category::AgentTest);
    }

    #[test]
    fn test_other_category_is_excluded() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "test_misc.json");

        let mut registry = StaticRegistry::new();
        registry.register(
            "test_misc.json",
            TestClass::new(
                "MiscTests",
                Category::Other,
                vec!["test_anything".to_owned()],
                Rc::new(|| TestClass::of::<SummaryTests>().instantiate()),
            ),
        );
        let discoverer = Discoverer::new(&registry, "test_*.json", "test_").unwrap();
        assert!(discoverer.discover(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_canonical_path_falls_back_to_input() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone").join("test_x.json");
        assert_eq!(canonical_path(&missing), missing);

        let existing = temp.path().join("test_y.json");
        fs::write(&existing, "{}").unwrap();
        let nested = temp.path().join(".").join("test_y.json");
        assert_eq!(canonical_path(&nested), canonical_path(&existing));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let registry = StaticRegistry::new();
        assert!(Discoverer::new(&registry, "test_[", "test_").is_err());
    }

    #[test]
    fn test_add_class_filters_prefix() {
        let mut suite = TestSuite::new();
        assert_eq!(suite.add_class(&TestClass::of::<SummaryTests>(), "test_"), 2);
        assert_eq!(suite.len(), 2);
        assert_eq!(suite.units()[0].to_string(), "SummaryTests.test_short");
    }
}
