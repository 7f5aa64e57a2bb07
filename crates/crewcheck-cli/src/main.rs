//! crewcheck - discover and run agent and crew test suites
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::assertions_on_result_states,
        reason = "Allow for tests"
    )
)]

use anyhow::{Context as _, Result};
use clap::Parser as _;
use cli::Cli;
use std::process::ExitCode;

mod cli;
mod handlers;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let code = handlers::handle_run(&cli).context("Error running tests")?;
    Ok(ExitCode::from(code))
}
