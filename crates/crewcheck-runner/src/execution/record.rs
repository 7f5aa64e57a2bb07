//! Per-unit outcomes.

use crate::case::{Category, TestFault};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How a test unit ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// Completed normally
    Success,
    /// An assertion did not hold
    Failure(String),
    /// Any other fault during setup, body or teardown
    Error(String),
}

impl Outcome {
    /// Whether the unit passed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Diagnostic trace of a failure or error
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(detail) | Self::Error(detail) => Some(detail),
        }
    }

    /// Short status label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Failure(_) => "FAIL",
            Self::Error(_) => "ERROR",
        }
    }
}

impl From<TestFault> for Outcome {
    fn from(fault: TestFault) -> Self {
        match fault {
            TestFault::Failure(violation) => Self::Failure(violation.detail()),
            TestFault::Error(message) => Self::Error(message),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Result of running one test unit. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// `Class.method`
    pub unit_id: String,
    /// Category of the owning class
    pub category: Category,
    /// How the unit ended
    pub outcome: Outcome,
    /// Fault raised by the teardown hook, if any
    pub teardown_fault: Option<String>,
    /// When the unit finished
    pub timestamp: DateTime<Utc>,
    /// Time spent in setup, body and teardown
    pub duration: Duration,
}

impl ResultRecord {
    /// Record a finished unit
    pub fn new<T: Into<String>>(unit_id: T, category: Category, outcome: Outcome) -> Self {
        Self {
            unit_id: unit_id.into(),
            category,
            outcome,
            teardown_fault: None,
            timestamp: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    /// Attach the teardown fault
    #[must_use]
    pub fn with_teardown_fault(mut self, fault: Option<String>) -> Self {
        self.teardown_fault = fault;
        self
    }

    /// Attach the elapsed time
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}
