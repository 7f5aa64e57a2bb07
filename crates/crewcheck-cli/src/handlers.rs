//! Command handlers for CLI operations

use anyhow::Result;
use console::{Term, style};
use crewcheck_core::RunnerConfig;
use crewcheck_runner::{
    Discoverer, FixtureLoader, TestRunner, render_console, write_html_report,
};
use std::io;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::cli::Cli;

/// Crates whose logs follow the verbosity flag
const LOG_TARGETS: [&str; 4] = [
    "crewcheck_core",
    "crewcheck_mock",
    "crewcheck_runner",
    "crewcheck",
];

/// Filter used when `RUST_LOG` is not set
fn default_filter(verbosity: u8) -> String {
    let level = if verbosity == 0 { "warn" } else { "info" };
    let mut filter = "warn".to_owned();
    for target in LOG_TARGETS {
        filter.push_str(&format!(",{target}={level}"));
    }
    filter
}

fn init_logging(verbosity: u8) {
    Registry::default()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity))),
        )
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .init();
}

/// Discover, run and report a test suite
///
/// # Errors
/// Returns an error if configuration, discovery or reporting fails
pub fn handle_run(cli: &Cli) -> Result<u8> {
    let config = cli.apply(RunnerConfig::load(cli.config.as_deref())?);
    init_logging(config.verbosity);
    tracing::debug!("Effective configuration: {config:?}");

    let term = Term::stdout();
    let test_dir = config.test_dir.display().to_string();

    if !config.test_dir.exists() {
        term.write_line(&format!(
            "{}",
            style(format!("Test directory '{test_dir}' not found.")).yellow()
        ))?;
        term.write_line("To get started with crewcheck:")?;
        term.write_line(&format!("1. Create a '{test_dir}' directory"))?;
        term.write_line(&format!(
            "2. Add test modules following the pattern '{}'",
            config.pattern
        ))?;
        term.write_line("3. Declare classes of kind 'agent' or 'crew'")?;
        return Ok(0);
    }

    term.write_line(&format!(
        "Discovering tests in '{test_dir}' with pattern '{}'...",
        config.pattern
    ))?;

    let loader = FixtureLoader::new();
    let suite = Discoverer::from_config(&loader, &config)?.discover(&config.test_dir)?;

    if suite.is_empty() {
        term.write_line(&format!("{}", style("No tests found.").yellow()))?;
        term.write_line("Make sure your test modules:")?;
        term.write_line(&format!("- Match the pattern '{}'", config.pattern))?;
        term.write_line("- Declare classes of kind 'agent' or 'crew'")?;
        term.write_line(&format!(
            "- Have test methods starting with '{}'",
            config.method_prefix
        ))?;
        return Ok(0);
    }

    term.write_line(&format!("Found {} test(s)", suite.len()))?;
    term.write_line("Running tests...")?;

    let result = TestRunner::from_config(&config).run(&suite);
    let mut out = term.clone();
    render_console(result.summary(), &mut out)?;

    if config.report {
        write_html_report(&result, &config.report_file)?;
        term.write_line(&format!(
            "Report generated: {}",
            config.report_file.display()
        ))?;
    }

    if !result.was_successful() {
        term.write_line(&format!(
            "{}",
            style(format!(
                "{} failure(s), {} error(s)",
                result.summary().failure_count,
                result.summary().error_count
            ))
            .red()
            .bold()
        ))?;
    }

    Ok(u8::try_from(result.exit_code()).unwrap_or(1))
}
