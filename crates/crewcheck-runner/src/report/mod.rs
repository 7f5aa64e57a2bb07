//! Rendering run results.

mod html;

pub use html::{render_html, write_html_report};

use crate::execution::{FaultEntry, ResultSummary};
use crewcheck_core::Result;
use serde_json::to_string_pretty;
use std::io::{self, Write};

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------------";

/// Write the console summary: totals, per-category counts, success rate and
/// every failure and error with its trace.
///
/// # Errors
/// Returns an error if writing fails
pub fn render_console<W: Write + ?Sized>(summary: &ResultSummary, out: &mut W) -> io::Result<()> {
    for (kind, entries) in [("FAIL", &summary.failures), ("ERROR", &summary.errors)] {
        write_entries(out, kind, entries)?;
    }

    writeln!(out, "{RULE}")?;
    writeln!(out, "CREW TEST SUMMARY")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Total Tests: {}", summary.total_tests)?;
    writeln!(out, "Successes: {}", summary.successes)?;
    writeln!(out, "Failures: {}", summary.failure_count)?;
    writeln!(out, "Errors: {}", summary.error_count)?;
    writeln!(out, "Success Rate: {:.1}%", summary.success_percentage())?;
    writeln!(out)?;
    writeln!(out, "Test Categories:")?;
    writeln!(out, "  Agent Tests: {}", summary.agent_tests)?;
    writeln!(out, "  Crew Tests: {}", summary.crew_tests)?;
    writeln!(out, "{RULE}")?;

    let verdict = if summary.was_successful() { "OK" } else { "FAILED" };
    writeln!(out, "{verdict}")?;
    Ok(())
}

fn write_entries<W: Write + ?Sized>(out: &mut W, kind: &str, entries: &[FaultEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{RULE}")?;
        writeln!(out, "{kind}: {}", entry.unit_id)?;
        writeln!(out, "{THIN_RULE}")?;
        writeln!(out, "{}", entry.trace)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Render the summary as pretty-printed JSON
///
/// # Errors
/// Returns an error if serialization fails
pub fn summary_json(summary: &ResultSummary) -> Result<String> {
    Ok(to_string_pretty(summary)?)
}
