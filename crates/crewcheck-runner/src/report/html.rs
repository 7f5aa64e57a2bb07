//! Static HTML report.

use crate::execution::{FaultEntry, RunResult};
use crewcheck_core::Result;
use std::fs;
use std::path::Path;

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; }
.summary { background: #f5f5f5; padding: 1em; border-radius: 4px; }
.success { color: #2e7d32; }
.failure { color: #c62828; }
.error { color: #ef6c00; }
table { border-collapse: collapse; width: 100%; margin-top: 1em; }
th, td { border: 1px solid #ddd; padding: 6px; text-align: left; vertical-align: top; }
pre { white-space: pre-wrap; margin: 0; }";

/// Escape text for HTML element content and attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn fault_table(html: &mut String, title: &str, class: &str, entries: &[FaultEntry]) {
    if entries.is_empty() {
        return;
    }

    html.push_str(&format!("<h2 class=\"{class}\">{title}</h2>\n"));
    html.push_str("<table>\n<tr><th>Test</th><th>Trace</th></tr>\n");
    for entry in entries {
        html.push_str(&format!(
            "<tr><td>{}</td><td><pre>{}</pre></td></tr>\n",
            escape(&entry.unit_id),
            escape(&entry.trace)
        ));
    }
    html.push_str("</table>\n");
}

/// Render the full HTML report
pub fn render_html(result: &RunResult) -> String {
    let summary = result.summary();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Crew Test Report</title>\n");
    html.push_str(&format!("<style>\n{STYLE}\n</style>\n"));
    html.push_str("</head>\n<body>\n<h1>Crew Test Report</h1>\n");

    html.push_str("<div class=\"summary\">\n<h2>Summary</h2>\n");
    html.push_str(&format!("<p>Total Tests: {}</p>\n", summary.total_tests));
    html.push_str(&format!("<p class=\"success\">Successes: {}</p>\n", summary.successes));
    html.push_str(&format!("<p class=\"failure\">Failures: {}</p>\n", summary.failure_count));
    html.push_str(&format!("<p class=\"error\">Errors: {}</p>\n", summary.error_count));
    html.push_str(&format!("<p>Success Rate: {:.1}%</p>\n", summary.success_percentage()));
    html.push_str("<h3>Test Categories</h3>\n");
    html.push_str(&format!("<p>Agent Tests: {}</p>\n", summary.agent_tests));
    html.push_str(&format!("<p>Crew Tests: {}</p>\n", summary.crew_tests));
    html.push_str("</div>\n");

    fault_table(&mut html, "Failures", "failure", &summary.failures);
    fault_table(&mut html, "Errors", "error", &summary.errors);

    html.push_str("<h2>All Tests</h2>\n<table>\n");
    html.push_str("<tr><th>Test</th><th>Category</th><th>Status</th><th>Duration</th></tr>\n");
    for record in result.records() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.3}s</td></tr>\n",
            escape(&record.unit_id),
            record.category,
            record.outcome.label(),
            record.duration.as_secs_f64()
        ));
    }
    html.push_str("</table>\n</body>\n</html>\n");

    html
}

/// Write the HTML report to `path`
///
/// # Errors
/// Returns an error if the file cannot be written
pub fn write_html_report(result: &RunResult, path: &Path) -> Result<()> {
    fs::write(path, render_html(result))?;
    tracing::info!("HTML report written to {}", path.display());
    Ok(())
}
