use core::result::Result as CoreResult;
use thiserror::Error;

/// Result of an assertion.
pub type AssertResult = CoreResult<(), AssertionViolation>;

/// An expected property of an output did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionViolation {
    /// Human readable description of the violation
    pub message: String,
    /// Expected value, where one applies
    pub expected: Option<String>,
    /// Actual value, where one applies
    pub actual: Option<String>,
    /// Underlying error, kept when a custom message replaces the default
    pub cause: Option<String>,
}

impl AssertionViolation {
    /// Create a violation with only a message
    pub fn new<T: Into<String>>(message: T) -> Self {
        Self {
            message: message.into(),
            expected: None,
            actual: None,
            cause: None,
        }
    }

    /// Create a violation using the custom message when given
    pub(crate) fn with_default<F>(custom: Option<&str>, default: F) -> Self
    where
        F: FnOnce() -> String,
    {
        Self::new(custom.map_or_else(default, ToOwned::to_owned))
    }

    /// Attach the expected value
    #[must_use]
    pub fn expected<T: Into<String>>(mut self, expected: T) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attach the actual value
    #[must_use]
    pub fn actual<T: Into<String>>(mut self, actual: T) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Attach the underlying error
    #[must_use]
    pub fn caused_by<T: Into<String>>(mut self, cause: T) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Message plus expected/actual values and cause, for reports
    pub fn detail(&self) -> String {
        let mut detail = self.message.clone();
        if let Some(expected) = &self.expected {
            detail.push_str("\n  expected: ");
            detail.push_str(expected);
        }
        if let Some(actual) = &self.actual {
            detail.push_str("\n  actual: ");
            detail.push_str(actual);
        }
        if let Some(cause) = &self.cause {
            detail.push_str("\n  cause: ");
            detail.push_str(cause);
        }
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_message_wins() {
        let violation = AssertionViolation::with_default(Some("custom"), || "default".to_owned());
        assert_eq!(violation.to_string(), "custom");

        let fallback = AssertionViolation::with_default(None, || "default".to_owned());
        assert_eq!(fallback.to_string(), "default");
    }

    #[test]
    fn test_detail_includes_values() {
        let violation = AssertionViolation::new("mismatch")
            .expected("a")
            .actual("b");
        assert_eq!(violation.detail(), "mismatch\n  expected: a\n  actual: b");
    }
}
