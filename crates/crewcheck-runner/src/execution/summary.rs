//! Aggregated statistics over a run.

use super::record::{Outcome, ResultRecord};
use crate::case::Category;
use serde::{Deserialize, Serialize};

/// A failed or errored unit with its diagnostic trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEntry {
    /// `Class.method`
    pub unit_id: String,
    /// Captured diagnostic trace
    pub trace: String,
}

/// Aggregate view over every [`ResultRecord`] of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Units run
    pub total_tests: usize,
    /// Units that passed
    pub successes: usize,
    /// Units whose assertions did not hold
    pub failure_count: usize,
    /// Units that raised any other fault
    pub error_count: usize,
    /// Units built on the agent scaffold
    pub agent_tests: usize,
    /// Units built on the crew scaffold
    pub crew_tests: usize,
    /// `(total - failures - errors) / total`, or 0 for an empty run
    pub success_rate: f64,
    /// Failed units in run order
    pub failures: Vec<FaultEntry>,
    /// Errored units in run order
    pub errors: Vec<FaultEntry>,
}

impl ResultSummary {
    /// Compute the summary of a list of records
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let mut summary = Self {
            total_tests: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.category {
                Category::AgentTest => summary.agent_tests += 1,
                Category::CrewTest => summary.crew_tests += 1,
                Category::Other => {}
            }

            match &record.outcome {
                Outcome::Success => summary.successes += 1,
                Outcome::Failure(trace) => summary.failures.push(FaultEntry {
                    unit_id: record.unit_id.clone(),
                    trace: trace.clone(),
                }),
                Outcome::Error(trace) => summary.errors.push(FaultEntry {
                    unit_id: record.unit_id.clone(),
                    trace: trace.clone(),
                }),
            }
        }

        summary.failure_count = summary.failures.len();
        summary.error_count = summary.errors.len();
        summary.success_rate = success_rate(
            summary.total_tests,
            summary.failure_count,
            summary.error_count,
        );
        summary
    }

    /// Whether nothing failed or errored
    pub fn was_successful(&self) -> bool {
        self.failure_count == 0 && self.error_count == 0
    }

    /// Success rate as a percentage
    pub fn success_percentage(&self) -> f64 {
        self.success_rate * 100.0
    }
}

/// Share of units that neither failed nor errored; 0 for an empty run.
pub fn success_rate(total: usize, failures: usize, errors: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    total.saturating_sub(failures + errors) as f64 / total as f64
}

/// Collects records as units complete.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    records: Vec<ResultRecord>,
}

impl ResultAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the record of a finished unit
    pub fn record(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    /// Records in completion order
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Number of recorded units
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Summary of the records so far
    pub fn summary(&self) -> ResultSummary {
        ResultSummary::from_records(&self.records)
    }

    /// Finish aggregation
    pub fn finish(self) -> RunResult {
        let summary = self.summary();
        RunResult {
            records: self.records,
            summary,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    records: Vec<ResultRecord>,
    summary: ResultSummary,
}

impl RunResult {
    /// Per-unit records in run order
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Aggregate summary
    pub fn summary(&self) -> &ResultSummary {
        &self.summary
    }

    /// Failed units with their traces
    pub fn failures(&self) -> &[FaultEntry] {
        &self.summary.failures
    }

    /// Errored units with their traces
    pub fn errors(&self) -> &[FaultEntry] {
        &self.summary.errors
    }

    /// Whether nothing failed or errored
    pub fn was_successful(&self) -> bool {
        self.summary.was_successful()
    }

    /// Process exit code: 0 iff no failure and no error was recorded
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.was_successful())
    }
}
