//! Quality assertion delegating scoring to an external evaluator.

use crate::violation::AssertionViolation;
use crewcheck_core::{Error as CoreError, EvaluationScore, QualityEvaluator, RawOutput, Task};
use thiserror::Error;

/// Expected output handed to the evaluator when the task has none.
const DEFAULT_EXPECTED_OUTPUT: &str = "High quality response";

/// Failure of a quality check.
#[derive(Debug, Error)]
pub enum QualityError {
    /// The score was below the threshold
    #[error(transparent)]
    Violation(#[from] AssertionViolation),

    /// The evaluator itself failed
    #[error("Quality evaluator failed: {0}")]
    Evaluator(#[from] CoreError),
}

/// Assert that an output scores at least `min_score` with the evaluator.
///
/// A missing score passes: only a present score below the threshold fails.
///
/// # Errors
/// Returns a violation if the score is below the threshold, or an evaluator
/// error if scoring failed
pub fn assert_agent_response_quality<O: RawOutput + ?Sized>(
    output: &O,
    task: &Task,
    min_score: f64,
    evaluator: &dyn QualityEvaluator,
    msg: Option<&str>,
) -> Result<EvaluationScore, QualityError> {
    let expected = task
        .expected_output
        .as_deref()
        .unwrap_or(DEFAULT_EXPECTED_OUTPUT);
    let score = evaluator.evaluate(&task.description, expected, output.raw_text())?;

    if let Some(value) = score.score
        && value < min_score
    {
        return Err(AssertionViolation::with_default(msg, || {
            format!(
                "Agent response quality below threshold. Score: {value:.1}/{min_score}. Feedback: {}",
                score.feedback
            )
        })
        .expected(min_score.to_string())
        .actual(value.to_string())
        .into());
    }

    Ok(score)
}
