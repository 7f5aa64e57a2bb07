//! Behavioral assertions over recorded tool calls.

use crate::violation::{AssertResult, AssertionViolation};
use crewcheck_core::{Agent as _, Tool as _, ToolKwargs};
use crewcheck_mock::{MockAgent, MockTool};
use serde_json::Value;

/// Assert that a mock agent called the named tool, either through a
/// simulated call or through one of its attached tools.
///
/// # Errors
/// Returns a violation if no such call was recorded
pub fn assert_agent_called_tool(agent: &MockAgent, tool_name: &str, msg: Option<&str>) -> AssertResult {
    if agent.used_tool(tool_name) {
        return Ok(());
    }

    Err(AssertionViolation::with_default(msg, || {
        format!("Agent '{}' did not call expected tool '{tool_name}'", agent.role())
    }))
}

/// Assert that a mock tool was called with exactly these arguments.
///
/// # Errors
/// Returns a violation if no recorded call matches
pub fn assert_tool_called_with(
    tool: &MockTool,
    args: &[Value],
    kwargs: &ToolKwargs,
    msg: Option<&str>,
) -> AssertResult {
    if tool.was_called_with(args, kwargs) {
        return Ok(());
    }

    Err(AssertionViolation::with_default(msg, || {
        format!("Tool '{}' was not called with the expected arguments", tool.name())
    })
    .expected(format!("args={args:?} kwargs={kwargs:?}"))
    .actual(format!("{} recorded call(s)", tool.call_count())))
}

/// Assert that a mock tool was called exactly `expected` times.
///
/// # Errors
/// Returns a violation if the count differs
pub fn assert_tool_call_count(tool: &MockTool, expected: usize, msg: Option<&str>) -> AssertResult {
    let actual = tool.call_count();
    if actual == expected {
        return Ok(());
    }

    Err(AssertionViolation::with_default(msg, || {
        format!("Tool '{}' was called {actual} time(s), expected {expected}", tool.name())
    })
    .expected(expected.to_string())
    .actual(actual.to_string()))
}
