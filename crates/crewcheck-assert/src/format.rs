//! Structural format checks.

use crate::violation::{AssertResult, AssertionViolation};
use crewcheck_core::RawOutput;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Characters whose presence marks a payload as Markdown.
const MARKDOWN_INDICATORS: [char; 8] = ['#', '*', '-', '`', '[', ']', '(', ')'];

/// Output format that can be checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Syntactically valid JSON
    Json,
    /// Heuristic Markdown check
    Markdown,
    /// Heuristic YAML check
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(other.to_owned()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Yaml => "yaml",
        };
        formatter.write_str(name)
    }
}

/// A line fits the YAML heuristic when it is a mapping entry, a sequence
/// item, or an indented continuation.
fn is_yaml_line(line: &str) -> bool {
    if line.starts_with(' ') || line.starts_with('\t') {
        return true;
    }
    let trimmed = line.trim_end();
    trimmed == "-"
        || trimmed == "---"
        || trimmed.starts_with("- ")
        || trimmed.ends_with(':')
        || trimmed.contains(": ")
}

fn check_yaml(content: &str) -> bool {
    let mut lines = content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .peekable();
    lines.peek().is_some() && lines.all(is_yaml_line)
}

/// Assert that an output is in the given format (`json`, `markdown`, `yaml`).
///
/// # Errors
/// Returns a violation if the payload does not fit the format or the format
/// name is unknown
pub fn assert_output_format<O: RawOutput + ?Sized>(
    output: &O,
    format_type: &str,
    msg: Option<&str>,
) -> AssertResult {
    let format = format_type.parse::<OutputFormat>().map_err(|name| {
        AssertionViolation::new(format!("Unsupported output format: {name}"))
    })?;
    let content = output.raw_text();

    match format {
        OutputFormat::Json => match serde_json::from_str::<Value>(content) {
            Ok(_) => Ok(()),
            Err(err) => {
                let violation = AssertionViolation::with_default(msg, || {
                    format!("Output is not valid JSON: {err}")
                })
                .actual(content);
                Err(match msg {
                    Some(_) => violation.caused_by(err.to_string()),
                    None => violation,
                })
            }
        },
        OutputFormat::Markdown => {
            if content.contains(MARKDOWN_INDICATORS) {
                Ok(())
            } else {
                Err(AssertionViolation::with_default(msg, || {
                    "Output does not appear to be Markdown format".to_owned()
                })
                .actual(content))
            }
        }
        OutputFormat::Yaml => {
            if check_yaml(content) {
                Ok(())
            } else {
                Err(AssertionViolation::with_default(msg, || {
                    "Output does not appear to be YAML format".to_owned()
                })
                .actual(content))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_valid() {
        assert_output_format(r#"{"a": 1}"#, "json", None).unwrap();
        assert_output_format("[1, 2, 3]", "JSON", None).unwrap();
    }

    #[test]
    fn test_json_unquoted_key_fails() {
        let violation = assert_output_format("{a: 1}", "json", None).unwrap_err();
        assert!(violation.message.starts_with("Output is not valid JSON: "));
        assert!(violation.message.len() > "Output is not valid JSON: ".len());
    }

    #[test]
    fn test_json_custom_message_keeps_parse_error() {
        let violation = assert_output_format("{a: 1}", "json", Some("Writer must answer with JSON"))
            .unwrap_err();
        assert_eq!(violation.message, "Writer must answer with JSON");
        let cause = violation.cause.as_deref().unwrap();
        assert!(cause.contains("line 1"));
        assert!(violation.detail().contains("\n  cause: "));

        let default = assert_output_format("{a: 1}", "json", None).unwrap_err();
        assert!(default.cause.is_none());
    }

    #[test]
    fn test_json_empty_fails() {
        assert!(assert_output_format("", "json", None).is_err());
    }

    #[test]
    fn test_markdown_heuristic() {
        assert_output_format("# Title\nBody", "markdown", None).unwrap();
        assert_output_format("see [link](url)", "md", None).unwrap();
        let violation = assert_output_format("plain prose", "markdown", None).unwrap_err();
        assert_eq!(
            violation.message,
            "Output does not appear to be Markdown format"
        );
    }

    #[test]
    fn test_yaml_heuristic() {
        assert_output_format("name: crew\nagents:\n  - researcher\n", "yaml", None).unwrap();
        assert_output_format("# comment\n- one\n- two", "yml", None).unwrap();
        assert!(assert_output_format("just a sentence", "yaml", None).is_err());
        assert!(assert_output_format("", "yaml", None).is_err());
    }

    #[test]
    fn test_unknown_format() {
        let violation = assert_output_format("{}", "xml", None).unwrap_err();
        assert_eq!(violation.message, "Unsupported output format: xml");
    }

    #[test]
    fn test_custom_message() {
        let violation = assert_output_format("nope", "json", Some("bad json")).unwrap_err();
        assert_eq!(violation.message, "bad json");
    }
}
