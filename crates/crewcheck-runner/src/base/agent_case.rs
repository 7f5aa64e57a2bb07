//! Scaffolding for testing a single agent in isolation.

use crate::case::{BaseCase, Category, TestFault, TestResult};
use crewcheck_assert::{
    AssertResult, assert_agent_called_tool, assert_agent_response_contains,
    assert_agent_response_quality, assert_output_format,
};
use crewcheck_core::{
    Agent as _, Error, EvaluationScore, QualityEvaluator, RawOutput, Result, Task, TaskOutput,
};
use crewcheck_mock::MockAgent;
use core::result::Result as CoreResult;

/// Base for agent test types.
///
/// Holds the agent under test, the tasks created for it and every output it
/// produced during the current test method.
#[derive(Debug, Default)]
pub struct AgentTestCase {
    /// Agent under test
    agent: Option<MockAgent>,
    /// Tasks created through [`Self::create_test_task`]
    test_tasks: Vec<Task>,
    /// Outputs captured by [`Self::execute_agent_task`]
    agent_outputs: Vec<TaskOutput>,
}

impl AgentTestCase {
    /// Create the agent under test with scripted responses
    pub fn create_test_agent<R, I, T>(&mut self, role: R, responses: I) -> &mut MockAgent
    where
        R: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.set_agent(MockAgent::new(role).with_responses(responses))
    }

    /// Use a fully configured mock agent as the agent under test
    pub fn set_agent(&mut self, agent: MockAgent) -> &mut MockAgent {
        self.agent.insert(agent)
    }

    /// Agent under test, if one was created
    pub fn agent(&self) -> Option<&MockAgent> {
        self.agent.as_ref()
    }

    /// Mutable agent under test, if one was created
    pub fn agent_mut(&mut self) -> Option<&mut MockAgent> {
        self.agent.as_mut()
    }

    fn require_agent(&mut self) -> Result<&mut MockAgent> {
        self.agent.as_mut().ok_or_else(|| {
            Error::Setup("no agent available, create an agent first".to_owned())
        })
    }

    /// Create a task assigned to the agent under test
    ///
    /// # Errors
    /// Returns an error if no agent was created yet
    pub fn create_test_task<T: Into<String>>(
        &mut self,
        description: T,
        expected_output: Option<&str>,
    ) -> Result<Task> {
        let role = self.require_agent()?.role().to_owned();
        let mut task = Task::new(description).with_agent(role);
        task.expected_output = expected_output.map(ToOwned::to_owned);
        self.test_tasks.push(task.clone());
        Ok(task)
    }

    /// Execute a task with the agent under test and capture the output
    ///
    /// # Errors
    /// Returns an error if no agent was created yet
    pub fn execute_agent_task(&mut self, task: &Task) -> Result<TaskOutput> {
        let output = self.require_agent()?.execute(task);
        self.agent_outputs.push(output.clone());
        Ok(output)
    }

    /// Tasks created during the current test
    pub fn tasks(&self) -> &[Task] {
        &self.test_tasks
    }

    /// Outputs captured during the current test
    pub fn agent_outputs(&self) -> &[TaskOutput] {
        &self.agent_outputs
    }

    /// Most recent captured output
    pub fn last_agent_output(&self) -> Option<&TaskOutput> {
        self.agent_outputs.last()
    }

    /// Captured outputs containing `content`, ignoring case
    pub fn agent_outputs_containing(&self, content: &str) -> Vec<&TaskOutput> {
        let needle = content.to_lowercase();
        self.agent_outputs
            .iter()
            .filter(|output| output.raw.to_lowercase().contains(&needle))
            .collect()
    }

    /// See [`assert_agent_response_contains`]
    ///
    /// # Errors
    /// Returns a violation if the content is missing
    pub fn assert_response_contains<O: RawOutput + ?Sized>(
        &self,
        output: &O,
        expected_content: &str,
        case_sensitive: bool,
        msg: Option<&str>,
    ) -> AssertResult {
        assert_agent_response_contains(output, expected_content, case_sensitive, msg)
    }

    /// See [`assert_agent_response_quality`]
    ///
    /// # Errors
    /// Returns a failure if the score is below `min_score`, or an error if
    /// the evaluator fails
    pub fn assert_response_quality<O: RawOutput + ?Sized>(
        &self,
        output: &O,
        task: &Task,
        min_score: f64,
        evaluator: &dyn QualityEvaluator,
        msg: Option<&str>,
    ) -> CoreResult<EvaluationScore, TestFault> {
        Ok(assert_agent_response_quality(output, task, min_score, evaluator, msg)?)
    }

    /// See [`assert_output_format`]
    ///
    /// # Errors
    /// Returns a violation if the output is not in the given format
    pub fn assert_output_format<O: RawOutput + ?Sized>(
        &self,
        output: &O,
        format_type: &str,
        msg: Option<&str>,
    ) -> AssertResult {
        assert_output_format(output, format_type, msg)
    }

    /// Check that the agent under test called a tool
    ///
    /// # Errors
    /// Returns a failure if the tool was not called, or an error if no agent
    /// was created
    pub fn assert_agent_used_tool(&self, tool_name: &str, msg: Option<&str>) -> TestResult {
        let agent = self
            .agent
            .as_ref()
            .ok_or_else(|| TestFault::error("no agent available to check tool usage"))?;
        assert_agent_called_tool(agent, tool_name, msg)?;
        Ok(())
    }
}

impl BaseCase for AgentTestCase {
    const CATEGORY: Category = Category::AgentTest;

    fn set_up(&mut self) -> TestResult {
        *self = Self::default();
        Ok(())
    }

    fn tear_down(&mut self) -> TestResult {
        self.agent = None;
        self.test_tasks.clear();
        self.agent_outputs.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewcheck_core::ToolKwargs;

    #[test]
    fn test_task_requires_agent() {
        let mut case = AgentTestCase::default();
        let error = case.create_test_task("Summarize", None).unwrap_err();
        assert!(matches!(error, Error::Setup(_)));
        assert!(case.execute_agent_task(&Task::new("Summarize")).is_err());
    }

    #[test]
    fn test_execute_captures_outputs() {
        let mut case = AgentTestCase::default();
        case.create_test_agent("Researcher", ["Rust is fast", "Rust is SAFE"]);
        let task = case.create_test_task("Describe Rust", Some("A summary")).unwrap();
        assert_eq!(task.agent.as_deref(), Some("Researcher"));
        assert_eq!(task.expected_output.as_deref(), Some("A summary"));

        case.execute_agent_task(&task).unwrap();
        case.execute_agent_task(&task).unwrap();

        assert_eq!(case.last_agent_output().unwrap().raw, "Rust is SAFE");
        assert_eq!(case.agent_outputs_containing("safe").len(), 1);
        assert_eq!(case.agent_outputs_containing("rust").len(), 2);
        case.assert_response_contains(case.last_agent_output().unwrap(), "safe", false, None)
            .unwrap();
    }

    #[test]
    fn test_tear_down_clears_state() {
        let mut case = AgentTestCase::default();
        case.create_test_agent("Researcher", ["done"]);
        let task = case.create_test_task("Go", None).unwrap();
        case.execute_agent_task(&task).unwrap();

        case.tear_down().unwrap();
        assert!(case.agent().is_none());
        assert!(case.tasks().is_empty());
        assert!(case.last_agent_output().is_none());
    }

    #[test]
    fn test_used_tool_wrapper() {
        let mut case = AgentTestCase::default();
        assert!(matches!(
            case.assert_agent_used_tool("search", None),
            Err(TestFault::Error(_))
        ));

        case.create_test_agent("Researcher", ["done"])
            .simulate_tool_call("search", ToolKwargs::new(), "hit");
        case.assert_agent_used_tool("search", None).unwrap();
        assert!(matches!(
            case.assert_agent_used_tool("calculator", None),
            Err(TestFault::Failure(_))
        ));
    }
}
