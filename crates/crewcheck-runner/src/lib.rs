//! Discovery, execution and reporting for crewcheck test suites.
//!
//! Test units are ordinary Rust types implementing [`TestCase`] on top of one
//! of the two base scaffolds ([`AgentTestCase`], [`CrewTestCase`]), or
//! declarative JSON modules read by [`FixtureLoader`]. Discovery walks a
//! directory, hands each matching file to a caller-owned [`ModuleLoader`],
//! and collects one [`TestUnit`] per test method. [`TestRunner`] runs the
//! suite sequentially and aggregates a [`ResultSummary`].

#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::assertions_on_result_states,
        clippy::float_cmp,
        reason = "Allow for tests"
    )
)]

pub mod base;
pub mod case;
pub mod discovery;
pub mod execution;
pub mod report;

pub use base::{AgentTestCase, CrewMetrics, CrewTestCase};
pub use case::{
    BaseCase, Category, InstanceFactory, TestCase, TestClass, TestFault, TestInstance, TestMethod,
    TestResult,
};
pub use discovery::{
    Discoverer, FixtureLoader, LoadFault, ModuleLoader, SourceFile, StaticRegistry, TestSuite,
    TestUnit,
};
pub use execution::{
    FaultEntry, Outcome, ResultAggregator, ResultRecord, ResultSummary, RunResult, TestRunner,
};
pub use report::{render_console, render_html, summary_json, write_html_report};
