//! Mock tool with a fixed result and a queryable call history.

use chrono::{DateTime, Utc};
use crewcheck_core::{Result, Tool, ToolArgs, ToolKwargs};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default name of a mock tool.
pub const DEFAULT_TOOL_NAME: &str = "mock_tool";
/// Default value returned by a mock tool.
pub const DEFAULT_TOOL_RESULT: &str = "Mock tool result";

/// Function called instead of returning the fixed value.
pub type SideEffect = Box<dyn Fn(&[Value], &ToolKwargs) -> Value + Send + Sync>;

/// One recorded invocation of a mock tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Positional arguments
    pub args: ToolArgs,
    /// Keyword arguments
    pub kwargs: ToolKwargs,
    /// When the call happened
    pub timestamp: DateTime<Utc>,
}

/// Declarative mock tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockToolConfig {
    /// Tool name
    pub name: String,
    /// Tool description
    #[serde(default = "default_description")]
    pub description: String,
    /// Value returned on every call
    #[serde(default = "default_return_value")]
    pub return_value: Value,
}

fn default_description() -> String {
    "A mock tool for testing".to_owned()
}

fn default_return_value() -> Value {
    Value::String(DEFAULT_TOOL_RESULT.to_owned())
}

impl Default for MockToolConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOOL_NAME.to_owned(),
            description: default_description(),
            return_value: default_return_value(),
        }
    }
}

/// Deterministic stand-in for a real tool.
///
/// Calls are recorded behind a mutex so the tool can be shared through an
/// `Arc` between the agent that holds it and the test that inspects it.
pub struct MockTool {
    /// Tool name
    name: String,
    /// Tool description
    description: String,
    /// Fixed value returned when no side effect is set
    return_value: Value,
    /// Optional override computing the result from the call arguments
    side_effect: Option<SideEffect>,
    /// Every invocation in call order
    call_history: Mutex<Vec<CallRecord>>,
}

impl MockTool {
    /// Create a mock tool returning the default result
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            description: default_description(),
            return_value: default_return_value(),
            side_effect: None,
            call_history: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock tool from declarative configuration
    pub fn from_config(config: MockToolConfig) -> Self {
        Self::new(config.name)
            .with_description(config.description)
            .with_return_value(config.return_value)
    }

    /// Set the description
    #[must_use]
    pub fn with_description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = description.into();
        self
    }

    /// Set the fixed return value
    #[must_use]
    pub fn with_return_value<T: Into<Value>>(mut self, value: T) -> Self {
        self.return_value = value.into();
        self
    }

    /// Compute results with a side effect instead of the fixed value
    #[must_use]
    pub fn with_side_effect<F>(mut self, side_effect: F) -> Self
    where
        F: Fn(&[Value], &ToolKwargs) -> Value + Send + Sync + 'static,
    {
        self.side_effect = Some(Box::new(side_effect));
        self
    }

    fn history(&self) -> MutexGuard<'_, Vec<CallRecord>> {
        self.call_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a call and return the side effect output or the fixed value
    pub fn invoke(&self, args: &[Value], kwargs: &ToolKwargs) -> Value {
        self.history().push(CallRecord {
            args: args.to_vec(),
            kwargs: kwargs.clone(),
            timestamp: Utc::now(),
        });

        tracing::debug!("Mock tool {} called with {} args", self.name, args.len());

        match &self.side_effect {
            Some(side_effect) => side_effect(args, kwargs),
            None => self.return_value.clone(),
        }
    }

    /// Copy of the call history
    pub fn call_history(&self) -> Vec<CallRecord> {
        self.history().clone()
    }

    /// Whether the tool was called at least once
    pub fn was_called(&self) -> bool {
        !self.history().is_empty()
    }

    /// Whether some recorded call had exactly these arguments
    pub fn was_called_with(&self, args: &[Value], kwargs: &ToolKwargs) -> bool {
        self.history()
            .iter()
            .any(|call| call.args == args && &call.kwargs == kwargs)
    }

    /// Number of recorded calls
    pub fn call_count(&self) -> usize {
        self.history().len()
    }

    /// Clear the call history; return value and side effect are kept
    pub fn reset(&self) {
        self.history().clear();
    }

    /// Fixed return value
    pub fn return_value(&self) -> &Value {
        &self.return_value
    }
}

impl Default for MockTool {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_NAME)
    }
}

impl fmt::Debug for MockTool {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MockTool")
            .field("name", &self.name)
            .field("return_value", &self.return_value)
            .field("has_side_effect", &self.side_effect.is_some())
            .field("call_count", &self.call_count())
            .finish()
    }
}

impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, args: &[Value], kwargs: &ToolKwargs) -> Result<Value> {
        Ok(self.invoke(args, kwargs))
    }
}
