//! Scripted quality evaluator.

use crewcheck_core::{EvaluationScore, QualityEvaluator, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// One evaluation request received by a [`MockEvaluator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Task description that was evaluated
    pub task_description: String,
    /// Expected output given to the evaluator
    pub expected_output: String,
    /// Actual output that was scored
    pub actual_output: String,
}

/// Evaluator returning a fixed score, standing in for the semantic service.
#[derive(Debug)]
pub struct MockEvaluator {
    /// Score returned for every request
    score: EvaluationScore,
    /// Requests in arrival order
    requests: Mutex<Vec<EvaluationRequest>>,
}

impl MockEvaluator {
    /// Create an evaluator that always returns this score
    pub fn new<T: Into<String>>(score: Option<f64>, feedback: T) -> Self {
        Self {
            score: EvaluationScore::new(score, feedback),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Copy of the received requests
    pub fn requests(&self) -> Vec<EvaluationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl QualityEvaluator for MockEvaluator {
    fn evaluate(
        &self,
        task_description: &str,
        expected_output: &str,
        actual_output: &str,
    ) -> Result<EvaluationScore> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(EvaluationRequest {
                task_description: task_description.to_owned(),
                expected_output: expected_output.to_owned(),
                actual_output: actual_output.to_owned(),
            });
        Ok(self.score.clone())
    }
}
