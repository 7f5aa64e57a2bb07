//! Core types and traits for the crewcheck testing framework.
//!
//! This crate provides the output data shapes produced by agents and crews,
//! the collaborator traits the mock layer substitutes, error handling, and
//! runner configuration.

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

/// Runner configuration loaded from TOML.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Trait definitions for agents, tools, crews and evaluators.
pub mod traits;
/// Task and output data types.
pub mod types;

pub use config::RunnerConfig;
pub use error::{Error, Result};
pub use traits::{Agent, Crew, QualityEvaluator, Tool};
pub use types::{
    CrewInputs, CrewOutput, EvaluationScore, RawOutput, Task, TaskOutput, ToolArgs, ToolKwargs,
};
