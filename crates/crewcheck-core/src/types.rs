use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Positional arguments passed to a tool.
pub type ToolArgs = Vec<Value>;

/// Keyword arguments passed to a tool. Equality ignores insertion order.
pub type ToolKwargs = Map<String, Value>;

/// Named inputs interpolated into task descriptions at crew kickoff.
pub type CrewInputs = BTreeMap<String, String>;

/// A unit of work handed to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// What the agent is asked to do
    pub description: String,
    /// What a good answer looks like, used by quality evaluation
    #[serde(default)]
    pub expected_output: Option<String>,
    /// Role of the agent assigned to this task
    #[serde(default)]
    pub agent: Option<String>,
}

impl Task {
    /// Create a task with only a description
    pub fn new<T: Into<String>>(description: T) -> Self {
        Self {
            description: description.into(),
            expected_output: None,
            agent: None,
        }
    }

    /// Set the expected output
    #[must_use]
    pub fn with_expected_output<T: Into<String>>(mut self, expected: T) -> Self {
        self.expected_output = Some(expected.into());
        self
    }

    /// Assign the task to an agent role
    #[must_use]
    pub fn with_agent<T: Into<String>>(mut self, role: T) -> Self {
        self.agent = Some(role.into());
        self
    }
}

/// Output of a single task.
///
/// Inside a crew output this is the per-task child outcome: `error` is the
/// explicit tagged failure detail, so a task succeeded iff it is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Description of the task that produced this output
    pub description: String,
    /// Raw text payload
    pub raw: String,
    /// Role of the agent that produced the output
    pub agent: String,
    /// Error detail when the task failed
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskOutput {
    /// Create a successful task output
    pub fn new<D, R, A>(description: D, raw: R, agent: A) -> Self
    where
        D: Into<String>,
        R: Into<String>,
        A: Into<String>,
    {
        Self {
            description: description.into(),
            raw: raw.into(),
            agent: agent.into(),
            error: None,
        }
    }

    /// Create a failed task output carrying an error detail
    pub fn failed<D, A, E>(description: D, agent: A, error: E) -> Self
    where
        D: Into<String>,
        A: Into<String>,
        E: Into<String>,
    {
        Self {
            description: description.into(),
            raw: String::new(),
            agent: agent.into(),
            error: Some(error.into()),
        }
    }

    /// Whether the task finished without an error detail
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Output of a crew run: the final payload plus one child output per task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Final raw text payload
    pub raw: String,
    /// Per-task outputs in execution order
    #[serde(default)]
    pub tasks_output: Vec<TaskOutput>,
}

impl CrewOutput {
    /// Create a crew output
    pub fn new<T: Into<String>>(raw: T, tasks_output: Vec<TaskOutput>) -> Self {
        Self {
            raw: raw.into(),
            tasks_output,
        }
    }

    /// First error detail carried by a child output, in task order
    pub fn first_error(&self) -> Option<&str> {
        self.tasks_output
            .iter()
            .find_map(|output| output.error.as_deref())
    }

    /// A crew run is successful iff it produced a payload and no child failed
    pub fn is_successful(&self) -> bool {
        !self.raw.is_empty() && self.first_error().is_none()
    }
}

/// Anything that carries a raw text payload.
pub trait RawOutput {
    /// The text payload
    fn raw_text(&self) -> &str;
}

impl RawOutput for str {
    fn raw_text(&self) -> &str {
        self
    }
}

impl RawOutput for String {
    fn raw_text(&self) -> &str {
        self
    }
}

impl RawOutput for TaskOutput {
    fn raw_text(&self) -> &str {
        &self.raw
    }
}

impl RawOutput for CrewOutput {
    fn raw_text(&self) -> &str {
        &self.raw
    }
}

impl<T: RawOutput + ?Sized> RawOutput for &T {
    fn raw_text(&self) -> &str {
        (**self).raw_text()
    }
}

/// Result of a semantic quality evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationScore {
    /// Score on a 0-10 scale, absent when the evaluator could not score
    pub score: Option<f64>,
    /// Evaluator feedback
    #[serde(default)]
    pub feedback: String,
}

impl EvaluationScore {
    /// Create a score with feedback
    pub fn new<T: Into<String>>(score: Option<f64>, feedback: T) -> Self {
        Self {
            score,
            feedback: feedback.into(),
        }
    }
}
