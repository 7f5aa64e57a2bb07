//! Mock agent replaying scripted responses.

use crate::tool::MockTool;
use chrono::{DateTime, Utc};
use crewcheck_core::{Agent, Result, Task, TaskOutput, Tool as _, ToolKwargs};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Response used when an agent has no scripted responses.
pub const DEFAULT_RESPONSE: &str = "Mock response";
/// Default role of a mock agent.
pub const DEFAULT_ROLE: &str = "Mock Agent";

/// One task executed by a mock agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Description of the executed task
    pub task_description: String,
    /// Response that was replayed
    pub response: String,
    /// When the task was executed
    pub timestamp: DateTime<Utc>,
}

/// One simulated tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Name of the tool
    pub tool_name: String,
    /// Parameters the tool was called with
    pub parameters: ToolKwargs,
    /// Result the tool produced
    pub result: Value,
    /// When the call was recorded
    pub timestamp: DateTime<Utc>,
}

/// Declarative mock agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockAgentConfig {
    /// Agent role
    pub role: String,
    /// Agent goal
    #[serde(default = "default_goal")]
    pub goal: String,
    /// Agent backstory
    #[serde(default = "default_backstory")]
    pub backstory: String,
    /// Scripted responses replayed round-robin
    #[serde(default)]
    pub responses: Vec<String>,
    /// Names of tools attached to the agent
    #[serde(default)]
    pub tools: Vec<String>,
}

fn default_goal() -> String {
    "Provide mock responses".to_owned()
}

fn default_backstory() -> String {
    "A mock agent for testing".to_owned()
}

impl Default for MockAgentConfig {
    fn default() -> Self {
        Self {
            role: DEFAULT_ROLE.to_owned(),
            goal: default_goal(),
            backstory: default_backstory(),
            responses: Vec::new(),
            tools: Vec::new(),
        }
    }
}

/// Ordered, cyclic queue of canned responses. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResponseQueue {
    responses: Vec<String>,
    index: usize,
}

impl ResponseQueue {
    fn new(responses: Vec<String>) -> Self {
        let responses = if responses.is_empty() {
            vec![DEFAULT_RESPONSE.to_owned()]
        } else {
            responses
        };
        Self {
            responses,
            index: 0,
        }
    }

    fn next(&mut self) -> String {
        let response = self.responses[self.index % self.responses.len()].clone();
        self.index += 1;
        response
    }

    fn rewind(&mut self) {
        self.index = 0;
    }
}

/// Deterministic stand-in for a real agent.
///
/// Execution never fails: the agent only replays its queue, so failure
/// scenarios are scripted as error responses rather than runtime faults.
#[derive(Debug, Clone)]
pub struct MockAgent {
    /// Role identifier
    role: String,
    /// Goal
    goal: String,
    /// Backstory
    backstory: String,
    /// Scripted responses
    queue: ResponseQueue,
    /// Executed tasks in order
    execution_history: Vec<ExecutionRecord>,
    /// Simulated tool calls in order
    tool_calls: Vec<ToolCallRecord>,
    /// Tools attached to the agent
    tools: Vec<Arc<MockTool>>,
}

impl MockAgent {
    /// Create a mock agent with the given role and the default response
    pub fn new<T: Into<String>>(role: T) -> Self {
        Self {
            role: role.into(),
            goal: default_goal(),
            backstory: default_backstory(),
            queue: ResponseQueue::new(Vec::new()),
            execution_history: Vec::new(),
            tool_calls: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Create a mock agent from declarative configuration, without tools
    pub fn from_config(config: MockAgentConfig) -> Self {
        Self::new(config.role)
            .with_goal(config.goal)
            .with_backstory(config.backstory)
            .with_responses(config.responses)
    }

    /// Set the scripted responses
    #[must_use]
    pub fn with_responses<I, T>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.set_responses(responses);
        self
    }

    /// Set the goal
    #[must_use]
    pub fn with_goal<T: Into<String>>(mut self, goal: T) -> Self {
        self.goal = goal.into();
        self
    }

    /// Set the backstory
    #[must_use]
    pub fn with_backstory<T: Into<String>>(mut self, backstory: T) -> Self {
        self.backstory = backstory.into();
        self
    }

    /// Attach a shared tool
    #[must_use]
    pub fn with_tool(mut self, tool: Arc<MockTool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Goal of the agent
    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// Backstory of the agent
    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    /// Tools attached to the agent
    pub fn tools(&self) -> &[Arc<MockTool>] {
        &self.tools
    }

    /// Scripted responses in queue order
    pub fn responses(&self) -> &[String] {
        &self.queue.responses
    }

    /// Replay the next response and record the execution
    pub fn execute(&mut self, task: &Task) -> TaskOutput {
        let response = self.next_response();

        self.execution_history.push(ExecutionRecord {
            task_description: task.description.clone(),
            response: response.clone(),
            timestamp: Utc::now(),
        });

        tracing::debug!(
            "Mock agent {} executed task {:?}",
            self.role,
            task.description
        );

        TaskOutput::new(task.description.clone(), response, self.role.clone())
    }

    /// Advance the queue and return the response at the old position
    pub fn next_response(&mut self) -> String {
        self.queue.next()
    }

    /// Append a response to the queue
    pub fn add_response<T: Into<String>>(&mut self, response: T) {
        self.queue.responses.push(response.into());
    }

    /// Replace the queue and rewind it
    pub fn set_responses<I, T>(&mut self, responses: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.queue = ResponseQueue::new(responses.into_iter().map(Into::into).collect());
    }

    /// Record a tool call without invoking any tool
    pub fn simulate_tool_call<N, R>(&mut self, tool_name: N, parameters: ToolKwargs, result: R)
    where
        N: Into<String>,
        R: Into<Value>,
    {
        self.tool_calls.push(ToolCallRecord {
            tool_name: tool_name.into(),
            parameters,
            result: result.into(),
            timestamp: Utc::now(),
        });
    }

    /// Copy of the execution history
    pub fn execution_history(&self) -> Vec<ExecutionRecord> {
        self.execution_history.clone()
    }

    /// Copy of the simulated tool calls
    pub fn tool_calls(&self) -> Vec<ToolCallRecord> {
        self.tool_calls.clone()
    }

    /// Whether the agent called the named tool, either simulated or through
    /// one of its attached tools
    pub fn used_tool(&self, tool_name: &str) -> bool {
        self.tool_calls.iter().any(|call| call.tool_name == tool_name)
            || self
                .tools
                .iter()
                .any(|tool| tool.name() == tool_name && tool.was_called())
    }

    /// Clear both logs and rewind the queue; queue contents are kept
    pub fn reset(&mut self) {
        self.execution_history.clear();
        self.tool_calls.clear();
        self.queue.rewind();
    }
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE)
    }
}

impl Agent for MockAgent {
    fn role(&self) -> &str {
        &self.role
    }

    fn execute_task(&mut self, task: &Task) -> Result<TaskOutput> {
        Ok(self.execute(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_robin_responses() {
        let mut agent = MockAgent::new("Researcher").with_responses(["A", "B"]);
        let task = Task::new("Summarize");

        let replies: Vec<String> = (0..4).map(|_| agent.execute(&task).raw).collect();
        assert_eq!(replies, vec!["A", "B", "A", "B"]);
        assert_eq!(agent.execution_history().len(), 4);
    }

    #[test]
    fn test_default_response_when_empty() {
        let mut agent = MockAgent::new("Writer").with_responses(Vec::<String>::new());
        let output = agent.execute(&Task::new("Write"));
        assert_eq!(output.raw, DEFAULT_RESPONSE);
        assert_eq!(output.agent, "Writer");
        assert!(output.is_success());
    }

    #[test]
    fn test_execution_record_contents() {
        let mut agent = MockAgent::new("Analyst").with_responses(["42"]);
        agent.execute(&Task::new("Compute the answer"));
        let history = agent.execution_history();
        assert_eq!(history[0].task_description, "Compute the answer");
        assert_eq!(history[0].response, "42");
    }

    #[test]
    fn test_reset_rewinds_and_keeps_queue() {
        let mut agent = MockAgent::new("Researcher").with_responses(["A", "B"]);
        let task = Task::new("Summarize");
        agent.execute(&task);
        agent.simulate_tool_call("search", ToolKwargs::new(), "hit");
        agent.reset();

        assert!(agent.execution_history().is_empty());
        assert!(agent.tool_calls().is_empty());
        assert_eq!(agent.responses(), ["A", "B"]);
        assert_eq!(agent.execute(&task).raw, "A");
    }

    #[test]
    fn test_add_and_set_responses() {
        let mut agent = MockAgent::new("Researcher").with_responses(["A"]);
        agent.add_response("B");
        assert_eq!(agent.next_response(), "A");
        assert_eq!(agent.next_response(), "B");

        agent.set_responses(["X"]);
        assert_eq!(agent.next_response(), "X");
        assert_eq!(agent.next_response(), "X");
    }

    #[test]
    fn test_simulated_tool_call_is_recorded() {
        let mut agent = MockAgent::default();
        let mut params = ToolKwargs::new();
        params.insert("query".to_owned(), json!("rust"));
        agent.simulate_tool_call("search", params.clone(), json!(["a", "b"]));

        let calls = agent.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "search");
        assert_eq!(calls[0].parameters, params);
        assert!(agent.used_tool("search"));
        assert!(!agent.used_tool("calculator"));
    }

    #[test]
    fn test_used_tool_through_attached_tool() {
        let tool = Arc::new(MockTool::new("calculator"));
        let agent = MockAgent::default().with_tool(Arc::clone(&tool));
        assert!(!agent.used_tool("calculator"));

        tool.invoke(&[json!(2)], &ToolKwargs::new());
        assert!(agent.used_tool("calculator"));
    }

    #[test]
    fn test_execute_through_trait() {
        let mut agent = MockAgent::new("Researcher").with_responses(["done"]);
        let output = agent.execute_task(&Task::new("Go")).unwrap();
        assert_eq!(output.raw, "done");
        assert_eq!(Agent::role(&agent), "Researcher");
    }
}
