//! Test-case abstractions.
//!
//! A test type picks one of the two base scaffolds as its `Base`, which fixes
//! its [`Category`], and describes its test methods explicitly instead of
//! relying on runtime introspection.

mod class;
mod fault;

pub use class::{InstanceFactory, TestClass, TestInstance};
pub use fault::{Category, TestFault, TestResult};

use std::any::type_name;

/// Reusable setup/teardown scaffolding a test type builds on.
pub trait BaseCase {
    /// Category of every test type built on this base
    const CATEGORY: Category;

    /// Prepare the scaffolding before a test method runs
    ///
    /// # Errors
    /// Returns a fault if preparation fails
    fn set_up(&mut self) -> TestResult;

    /// Release the scaffolding after a test method ran
    ///
    /// # Errors
    /// Returns a fault if cleanup fails
    fn tear_down(&mut self) -> TestResult;
}

/// Body of a test method.
pub type TestBody<T> = fn(&mut T) -> TestResult;

/// A named test method of a test type.
pub struct TestMethod<T> {
    /// Method name, matched against the discovery prefix
    name: &'static str,
    /// Method body
    body: TestBody<T>,
}

impl<T> TestMethod<T> {
    /// Describe a method
    pub const fn new(name: &'static str, body: TestBody<T>) -> Self {
        Self { name, body }
    }

    /// Method name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the method on an instance
    ///
    /// # Errors
    /// Returns whatever fault the body raises
    pub fn call(&self, case: &mut T) -> TestResult {
        (self.body)(case)
    }
}

impl<T> Clone for TestMethod<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TestMethod<T> {}

/// A test type: a fresh instance is built with `Default` for every method.
pub trait TestCase: Default + 'static {
    /// Base scaffolding, either `AgentTestCase` or `CrewTestCase`
    type Base: BaseCase;

    /// Access the embedded base scaffolding
    fn base(&mut self) -> &mut Self::Base;

    /// Methods this type offers; discovery keeps those with the test prefix
    fn test_methods() -> Vec<TestMethod<Self>>;

    /// Name used in unit ids and reports
    fn class_name() -> String {
        let full = type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_owned()
    }

    /// Runs before every test method
    ///
    /// # Errors
    /// Returns a fault if setup fails
    fn set_up(&mut self) -> TestResult {
        self.base().set_up()
    }

    /// Runs after every test method, even when it failed
    ///
    /// # Errors
    /// Returns a fault if teardown fails
    fn tear_down(&mut self) -> TestResult {
        self.base().tear_down()
    }
}

/// List test methods of `Self` by name.
///
/// ```ignore
/// fn test_methods() -> Vec<TestMethod<Self>> {
///     test_methods![test_summary, test_uses_search]
/// }
/// ```
#[macro_export]
macro_rules! test_methods {
    ($($method:ident),* $(,)?) => {
        vec![$($crate::TestMethod::new(stringify!($method), Self::$method)),*]
    };
}
