use serde_json::Value;

use crate::types::{CrewInputs, CrewOutput, EvaluationScore, Task, TaskOutput, ToolKwargs};
use crate::Result;

/// An agent that can execute tasks.
pub trait Agent {
    /// Role identifier of the agent
    fn role(&self) -> &str;

    /// Execute a task and return its output
    ///
    /// # Errors
    /// Returns an error if the agent cannot produce an output
    fn execute_task(&mut self, task: &Task) -> Result<TaskOutput>;
}

/// A tool agents can call.
pub trait Tool {
    /// Tool name
    fn name(&self) -> &str;

    /// Human readable description
    fn description(&self) -> &str;

    /// Run the tool with positional and keyword arguments
    ///
    /// # Errors
    /// Returns an error if the tool invocation fails
    fn run(&self, args: &[Value], kwargs: &ToolKwargs) -> Result<Value>;
}

/// A multi-agent workflow.
pub trait Crew {
    /// Run every task of the crew and collect the outputs
    ///
    /// # Errors
    /// Returns an error if the crew cannot run at all; individual task
    /// failures are reported through child outputs instead
    fn kickoff(&mut self, inputs: &CrewInputs) -> Result<CrewOutput>;
}

/// External semantic evaluator used by quality assertions.
pub trait QualityEvaluator {
    /// Score an output against the task it answered
    ///
    /// # Errors
    /// Returns an error if the evaluator is unreachable or fails
    fn evaluate(
        &self,
        task_description: &str,
        expected_output: &str,
        actual_output: &str,
    ) -> Result<EvaluationScore>;
}
