//! Sequential execution of a suite.

mod record;
mod summary;

pub use record::{Outcome, ResultRecord};
pub use summary::{FaultEntry, ResultAggregator, ResultSummary, RunResult, success_rate};

use crate::case::{TestClass, TestFault, TestInstance};
use crate::discovery::{TestSuite, TestUnit};
use crewcheck_assert::AssertionViolation;
use crewcheck_core::RunnerConfig;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::Once;
use std::time::Instant;

static PANIC_HOOK: Once = Once::new();

thread_local! {
    /// Set while this thread runs a guarded hook
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    /// Location of the last panic caught on this thread
    static PANIC_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Runs test units one at a time and aggregates their outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestRunner {
    /// 0 is quiet, 1 logs the run, 2 logs every unit
    verbosity: u8,
}

impl TestRunner {
    /// Create a runner with the given verbosity
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    /// Create a runner using the configured verbosity
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.verbosity)
    }

    /// Run every unit of the suite in order
    pub fn run(&self, suite: &TestSuite) -> RunResult {
        if self.verbosity > 0 {
            tracing::info!("Running {} test(s)", suite.len());
        }

        let mut aggregator = ResultAggregator::new();
        for unit in suite {
            aggregator.record(self.run_unit(unit));
        }

        let result = aggregator.finish();
        if self.verbosity > 0 {
            let summary = result.summary();
            tracing::info!(
                "Ran {} test(s): {} passed, {} failed, {} errored",
                summary.total_tests,
                summary.successes,
                summary.failure_count,
                summary.error_count
            );
        }
        result
    }

    /// Run a single method of a class
    pub fn run_single(&self, class: &TestClass, method: &str) -> ResultRecord {
        self.run_unit(&TestUnit::new(class.clone(), method))
    }

    fn run_unit(&self, unit: &TestUnit) -> ResultRecord {
        let started = Instant::now();
        install_panic_hook();
        let (outcome, teardown_fault) = execute(unit);

        let record = ResultRecord::new(unit.id(), unit.category(), outcome)
            .with_teardown_fault(teardown_fault)
            .with_duration(started.elapsed());

        if let Some(fault) = &record.teardown_fault {
            tracing::warn!("Teardown of {} failed: {fault}", record.unit_id);
        }
        if self.verbosity >= 2 {
            tracing::info!("{} ... {}", record.unit_id, record.outcome);
        } else {
            tracing::debug!("{} ... {}", record.unit_id, record.outcome);
        }
        record
    }
}

/// Part of a unit a guarded hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Construction, setup and teardown
    Scaffold,
    /// The test method itself
    Body,
}

/// Wrap the current panic hook once per process.
///
/// Panics raised inside a guarded hook are recorded on their thread instead
/// of being printed; every other panic still reaches the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            if CAPTURING.get() {
                PANIC_LOCATION.set(info.location().map(ToString::to_string));
            } else {
                previous(info);
            }
        }));
    });
}

/// Construct, set up, run and tear down one unit.
///
/// Returns the outcome and the teardown fault, if teardown failed.
fn execute(unit: &TestUnit) -> (Outcome, Option<String>) {
    let mut instance = match guarded(Stage::Scaffold, || Ok(unit.class().instantiate())) {
        Ok(instance) => instance,
        Err(fault) => return (fault.into(), None),
    };

    if let Err(fault) = guarded(Stage::Scaffold, || instance.set_up()) {
        let teardown = tear_down(instance.as_mut());
        return (fault.into(), teardown);
    }

    let body = guarded(Stage::Body, || instance.run(unit.method()));
    let teardown = tear_down(instance.as_mut());

    let outcome = match (body, &teardown) {
        (Err(fault), _) => fault.into(),
        (Ok(()), Some(fault)) => Outcome::Error(format!("Teardown failed: {fault}")),
        (Ok(()), None) => Outcome::Success,
    };
    (outcome, teardown)
}

fn tear_down(instance: &mut dyn TestInstance) -> Option<String> {
    guarded(Stage::Scaffold, || instance.tear_down())
        .err()
        .map(|fault| fault.detail())
}

/// Run a hook, turning a panic into a fault.
fn guarded<T, F>(stage: Stage, hook: F) -> Result<T, TestFault>
where
    F: FnOnce() -> Result<T, TestFault>,
{
    CAPTURING.set(true);
    let caught = panic::catch_unwind(AssertUnwindSafe(hook));
    CAPTURING.set(false);

    caught.unwrap_or_else(|payload| Err(panic_fault(stage, &*payload, PANIC_LOCATION.take())))
}

/// A panic in the test method is a failure, as is an `assert!` family
/// panic anywhere else; any other panic is an error.
fn panic_fault(stage: Stage, payload: &(dyn Any + Send), location: Option<String>) -> TestFault {
    let message = payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    let message = match location {
        Some(location) => format!("{message} (at {location})"),
        None => message,
    };

    if stage == Stage::Body || message.starts_with("assertion") {
        TestFault::Failure(AssertionViolation::new(message))
    } else {
        TestFault::error(format!("panicked: {message}"))
    }
}
