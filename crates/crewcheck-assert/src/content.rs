//! Substring and pattern assertions over raw payloads.

use crate::violation::{AssertResult, AssertionViolation};
use crewcheck_core::RawOutput;
use regex::Regex;

/// Assert that an output contains the expected content.
///
/// Matching ignores case unless `case_sensitive` is set.
///
/// # Errors
/// Returns a violation if the content is not found
pub fn assert_agent_response_contains<O: RawOutput + ?Sized>(
    output: &O,
    expected_content: &str,
    case_sensitive: bool,
    msg: Option<&str>,
) -> AssertResult {
    let actual = output.raw_text();
    let found = if case_sensitive {
        actual.contains(expected_content)
    } else {
        actual
            .to_lowercase()
            .contains(&expected_content.to_lowercase())
    };

    if found {
        return Ok(());
    }

    Err(AssertionViolation::with_default(msg, || {
        format!("Expected content '{expected_content}' not found in agent output")
    })
    .expected(expected_content)
    .actual(actual))
}

/// Assert that an output contains a literal pattern, or matches a regular
/// expression when `regex` is set.
///
/// # Errors
/// Returns a violation if the pattern does not match or the regular
/// expression is invalid
pub fn assert_crew_output_matches<O: RawOutput + ?Sized>(
    output: &O,
    expected_pattern: &str,
    regex: bool,
    msg: Option<&str>,
) -> AssertResult {
    let actual = output.raw_text();

    if regex {
        let compiled = Regex::new(expected_pattern).map_err(|err| {
            AssertionViolation::new(format!("Invalid regex pattern {expected_pattern:?}: {err}"))
        })?;
        if compiled.is_match(actual) {
            return Ok(());
        }
        return Err(AssertionViolation::with_default(msg, || {
            format!("Crew output does not match regex pattern: {expected_pattern}")
        })
        .expected(expected_pattern)
        .actual(actual));
    }

    if actual.contains(expected_pattern) {
        return Ok(());
    }

    Err(AssertionViolation::with_default(msg, || {
        format!("Expected pattern '{expected_pattern}' not found in crew output")
    })
    .expected(expected_pattern)
    .actual(actual))
}
