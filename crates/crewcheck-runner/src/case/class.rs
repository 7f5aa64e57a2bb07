//! Type-erased test classes.

use super::{BaseCase, Category, TestCase, TestFault, TestMethod, TestResult};
use std::fmt;
use std::rc::Rc;

/// An instance of a test class, ready to run one method.
pub trait TestInstance {
    /// Run the setup hook
    ///
    /// # Errors
    /// Returns a fault if setup fails
    fn set_up(&mut self) -> TestResult;

    /// Run the named test method
    ///
    /// # Errors
    /// Returns the fault raised by the method
    fn run(&mut self, method: &str) -> TestResult;

    /// Run the teardown hook
    ///
    /// # Errors
    /// Returns a fault if teardown fails
    fn tear_down(&mut self) -> TestResult;
}

/// Builds a fresh instance for every test unit.
pub type InstanceFactory = Rc<dyn Fn() -> Box<dyn TestInstance>>;

/// Descriptor of a test class: name, category, methods and a factory.
#[derive(Clone)]
pub struct TestClass {
    /// Class name
    name: String,
    /// Category derived from the base scaffold
    category: Category,
    /// Method names in declaration order
    methods: Vec<String>,
    /// Instance factory
    factory: InstanceFactory,
}

impl TestClass {
    /// Describe a class from its parts
    pub fn new<N: Into<String>>(
        name: N,
        category: Category,
        methods: Vec<String>,
        factory: InstanceFactory,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            methods,
            factory,
        }
    }

    /// Describe a typed test case
    pub fn of<T: TestCase>() -> Self {
        let methods = T::test_methods()
            .iter()
            .map(|method| method.name().to_owned())
            .collect();
        let factory: InstanceFactory = Rc::new(|| -> Box<dyn TestInstance> {
            Box::new(CaseInstance::<T> {
                case: T::default(),
                methods: T::test_methods(),
            })
        });
        Self::new(T::class_name(), <T::Base as BaseCase>::CATEGORY, methods, factory)
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category
    pub fn category(&self) -> Category {
        self.category
    }

    /// Method names in declaration order
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Build a fresh instance
    pub fn instantiate(&self) -> Box<dyn TestInstance> {
        (self.factory)()
    }
}

impl fmt::Debug for TestClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TestClass")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// Adapter running a typed test case through [`TestInstance`].
struct CaseInstance<T> {
    case: T,
    methods: Vec<TestMethod<T>>,
}

impl<T: TestCase> TestInstance for CaseInstance<T> {
    fn set_up(&mut self) -> TestResult {
        self.case.set_up()
    }

    fn run(&mut self, method: &str) -> TestResult {
        let found = self
            .methods
            .iter()
            .find(|candidate| candidate.name() == method)
            .copied()
            .ok_or_else(|| {
                TestFault::error(format!("{} has no method {method:?}", T::class_name()))
            })?;
        found.call(&mut self.case)
    }

    fn tear_down(&mut self) -> TestResult {
        self.case.tear_down()
    }
}
