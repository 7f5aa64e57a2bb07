//! Domain assertions for agent and crew outputs.
//!
//! Every assertion is a synchronous predicate returning
//! `Err(AssertionViolation)` when the expected property does not hold. A
//! custom message, when given, replaces the default one.

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::assertions_on_result_states,
        clippy::float_cmp,
        reason = "Allow for tests"
    )
)]

mod content;
mod crew;
mod format;
mod quality;
mod tools;
mod violation;

pub use content::{assert_agent_response_contains, assert_crew_output_matches};
pub use crew::{
    assert_agent_collaboration, assert_crew_completed_successfully, assert_task_sequence,
};
pub use format::{OutputFormat, assert_output_format};
pub use quality::{QualityError, assert_agent_response_quality};
pub use tools::{assert_agent_called_tool, assert_tool_call_count, assert_tool_called_with};
pub use violation::{AssertResult, AssertionViolation};
