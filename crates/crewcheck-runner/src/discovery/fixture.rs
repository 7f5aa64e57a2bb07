//! Declarative JSON test modules.
//!
//! A module declares classes; each class declares its mock agents, mock
//! tools, crew tasks and test methods, and each test method is a list of
//! steps run in order:
//!
//! ```json
//! {
//!   "classes": [{
//!     "name": "ResearcherTests",
//!     "kind": "agent",
//!     "agents": [{"role": "Researcher", "responses": ["Rust is fast"], "tools": ["search"]}],
//!     "tools": [{"name": "search", "return_value": "3 hits"}],
//!     "tests": [{
//!       "name": "test_summary",
//!       "steps": [
//!         {"type": "execute", "task": "Summarize Rust"},
//!         {"type": "assert", "check": "contains", "text": "fast"}
//!       ]
//!     }]
//!   }]
//! }
//! ```

use crate::case::Category;
use crewcheck_core::{CrewInputs, Task, ToolArgs, ToolKwargs};
use crewcheck_mock::{MockAgentConfig, MockToolConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON test module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureModule {
    /// Classes declared by the module
    #[serde(default)]
    pub classes: Vec<FixtureClass>,
}

/// Which base scaffold a fixture class builds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    /// Single-agent test class
    Agent,
    /// Crew test class
    Crew,
    /// Anything else; never collected by discovery
    #[serde(other)]
    Other,
}

impl FixtureKind {
    /// Category of classes of this kind
    pub fn category(self) -> Category {
        match self {
            Self::Agent => Category::AgentTest,
            Self::Crew => Category::CrewTest,
            Self::Other => Category::Other,
        }
    }
}

/// A test class declared in a JSON module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureClass {
    /// Class name
    pub name: String,
    /// Base scaffold
    pub kind: FixtureKind,
    /// Mock agents; an agent class uses the first one
    #[serde(default)]
    pub agents: Vec<MockAgentConfig>,
    /// Mock tools, attached to agents by name
    #[serde(default)]
    pub tools: Vec<MockToolConfig>,
    /// Crew tasks in execution order
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Test methods in declaration order
    #[serde(default)]
    pub tests: Vec<FixtureTest>,
}

/// A test method declared as a list of steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureTest {
    /// Method name
    pub name: String,
    /// Steps run in order
    #[serde(default)]
    pub steps: Vec<FixtureStep>,
}

/// One step of a declarative test method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixtureStep {
    /// Execute a task with the agent under test
    Execute {
        /// Task description
        task: String,
        /// Expected output used by quality checks
        #[serde(default)]
        expected_output: Option<String>,
    },
    /// Kick off the crew
    Kickoff {
        /// Values interpolated into task descriptions
        #[serde(default)]
        inputs: CrewInputs,
    },
    /// Invoke a mock tool directly
    CallTool {
        /// Tool name
        tool: String,
        /// Positional arguments
        #[serde(default)]
        args: ToolArgs,
        /// Keyword arguments
        #[serde(default)]
        kwargs: ToolKwargs,
    },
    /// Record a tool call on an agent without invoking the tool
    SimulateToolCall {
        /// Agent role; defaults to the first agent
        #[serde(default)]
        agent: Option<String>,
        /// Tool name
        tool: String,
        /// Recorded parameters
        #[serde(default)]
        parameters: ToolKwargs,
        /// Recorded result
        #[serde(default)]
        result: Value,
    },
    /// Reset every agent and tool of the class
    Reset,
    /// Check an expected property
    Assert(AssertStep),
}

/// An assertion step with its optional custom message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertStep {
    /// What to check
    #[serde(flatten)]
    pub check: Check,
    /// Message replacing the default violation message
    #[serde(default)]
    pub message: Option<String>,
}

/// Checks available to assertion steps.
///
/// Output checks apply to the most recent agent or crew output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    /// Output contains text
    Contains {
        /// Expected text
        text: String,
        /// Compare case-sensitively
        #[serde(default)]
        case_sensitive: bool,
    },
    /// Output is in a format
    Format {
        /// `json`, `markdown` or `yaml`
        format: String,
    },
    /// Output contains a literal or regex pattern
    Matches {
        /// Pattern to look for
        pattern: String,
        /// Treat the pattern as a regular expression
        #[serde(default)]
        regex: bool,
    },
    /// Crew output is non-empty and no task failed
    CrewCompleted,
    /// Crew tasks ran in this order
    TaskSequence {
        /// Task descriptions after interpolation
        tasks: Vec<String>,
    },
    /// At least this many agents produced crew task outputs
    Collaboration {
        /// Minimum number of distinct agents
        min_agents: usize,
    },
    /// An agent called a tool
    AgentCalledTool {
        /// Agent role; defaults to the first agent
        #[serde(default)]
        agent: Option<String>,
        /// Tool name
        tool: String,
    },
    /// A tool was called with exactly these arguments
    ToolCalledWith {
        /// Tool name
        tool: String,
        /// Positional arguments
        #[serde(default)]
        args: ToolArgs,
        /// Keyword arguments
        #[serde(default)]
        kwargs: ToolKwargs,
    },
    /// A tool was called this many times
    ToolCallCount {
        /// Tool name
        tool: String,
        /// Expected number of calls
        count: usize,
    },
    /// Output scores at least `min_score` with the configured evaluator
    Quality {
        /// Minimum acceptable score
        min_score: f64,
    },
    /// An agent executed this many tasks
    ExecutionCount {
        /// Agent role; defaults to the first agent
        #[serde(default)]
        agent: Option<String>,
        /// Expected number of executions
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::from_str;

    #[test]
    fn test_parse_module() {
        let module: FixtureModule = from_str(
            r##"{
                "classes": [{
                    "name": "WriterTests",
                    "kind": "agent",
                    "agents": [{"role": "Writer", "responses": ["# Title"]}],
                    "tests": [{
                        "name": "test_markdown",
                        "steps": [
                            {"type": "execute", "task": "Write"},
                            {"type": "assert", "check": "format", "format": "markdown", "message": "not markdown"},
                            {"type": "assert", "check": "quality", "min_score": 7},
                            {"type": "reset"}
                        ]
                    }]
                }]
            }"##,
        )
        .unwrap();

        let class = &module.classes[0];
        assert_eq!(class.kind.category(), Category::AgentTest);
        let steps = &class.tests[0].steps;
        assert_eq!(steps.len(), 4);
        match &steps[1] {
            FixtureStep::Assert(step) => {
                assert!(matches!(&step.check, Check::Format { format } if format == "markdown"));
                assert_eq!(step.message.as_deref(), Some("not markdown"));
            }
            other => panic!("unexpected step {other:?}"),
        }
        assert!(matches!(
            &steps[2],
            FixtureStep::Assert(AssertStep { check: Check::Quality { min_score }, .. }) if *min_score == 7.0
        ));
    }

    #[test]
    fn test_unknown_kind_is_other() {
        let class: FixtureClass =
            from_str(r#"{"name": "Helpers", "kind": "fixture"}"#).unwrap();
        assert_eq!(class.kind, FixtureKind::Other);
        assert_eq!(class.kind.category(), Category::Other);
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let result = from_str::<FixtureStep>(r#"{"type": "sleep", "seconds": 1}"#);
        assert!(result.is_err());
    }
}
