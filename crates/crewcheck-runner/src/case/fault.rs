//! How a test unit can go wrong.

use crewcheck_assert::{AssertionViolation, QualityError};
use crewcheck_core::Error as CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a setup hook, test body or teardown hook.
pub type TestResult = Result<(), TestFault>;

/// Which base abstraction a test type builds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Exercises a single agent in isolation
    AgentTest,
    /// Exercises a multi-agent workflow end to end
    CrewTest,
    /// Builds on neither base; only reachable through hand-built suites
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AgentTest => "agent",
            Self::CrewTest => "crew",
            Self::Other => "other",
        };
        formatter.write_str(name)
    }
}

/// A fault raised by test code.
///
/// `Failure` is an assertion contract violation; `Error` is anything else.
/// The two are kept apart all the way into the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestFault {
    /// An expected property did not hold
    Failure(AssertionViolation),
    /// Any other unhandled fault
    Error(String),
}

impl TestFault {
    /// Create an error fault from a message
    pub fn error<T: Into<String>>(message: T) -> Self {
        Self::Error(message.into())
    }

    /// Diagnostic text for reports
    pub fn detail(&self) -> String {
        match self {
            Self::Failure(violation) => violation.detail(),
            Self::Error(message) => message.clone(),
        }
    }
}

impl fmt::Display for TestFault {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(violation) => write!(formatter, "failure: {violation}"),
            Self::Error(message) => write!(formatter, "error: {message}"),
        }
    }
}

impl From<AssertionViolation> for TestFault {
    fn from(violation: AssertionViolation) -> Self {
        Self::Failure(violation)
    }
}

impl From<CoreError> for TestFault {
    fn from(error: CoreError) -> Self {
        Self::Error(error.to_string())
    }
}

impl From<anyhow::Error> for TestFault {
    fn from(error: anyhow::Error) -> Self {
        Self::Error(format!("{error:#}"))
    }
}

impl From<QualityError> for TestFault {
    fn from(error: QualityError) -> Self {
        match error {
            QualityError::Violation(violation) => Self::Failure(violation),
            QualityError::Evaluator(inner) => Self::Error(inner.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use crewcheck_assert::assert_output_format;

    fn violating_body() -> TestResult {
        assert_output_format("{a: 1}", "json", None)?;
        Ok(())
    }

    fn erroring_body() -> TestResult {
        let lookup: Result<(), CoreError> = Err(CoreError::NotFound("agent 'Writer'".to_owned()));
        lookup?;
        Ok(())
    }

    #[test]
    fn test_question_mark_keeps_kinds_apart() {
        assert!(matches!(violating_body(), Err(TestFault::Failure(_))));
        assert!(matches!(erroring_body(), Err(TestFault::Error(_))));
    }

    #[test]
    fn test_anyhow_is_error() {
        let fault: TestFault = anyhow!("boom").into();
        assert_eq!(fault, TestFault::error("boom"));
    }

    #[test]
    fn test_quality_error_mapping() {
        let violation: TestFault =
            QualityError::Violation(AssertionViolation::new("low score")).into();
        assert!(matches!(violation, TestFault::Failure(_)));

        let evaluator: TestFault =
            QualityError::Evaluator(CoreError::Evaluation("down".to_owned())).into();
        assert_eq!(evaluator, TestFault::error("Evaluation failed: down"));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::AgentTest.to_string(), "agent");
        assert_eq!(Category::CrewTest.to_string(), "crew");
    }
}
