//! Crew-level completion and workflow assertions.

use crate::violation::{AssertResult, AssertionViolation};
use crewcheck_core::CrewOutput;
use std::collections::BTreeSet;

/// Assert that a crew run produced output and no task carries an error.
///
/// The first child error, in task order, is reported verbatim.
///
/// # Errors
/// Returns a violation if the payload is empty or a task failed
pub fn assert_crew_completed_successfully(crew_output: &CrewOutput, msg: Option<&str>) -> AssertResult {
    if crew_output.raw.is_empty() {
        return Err(AssertionViolation::with_default(msg, || {
            "Crew execution produced no output".to_owned()
        }));
    }

    if let Some(error) = crew_output.first_error() {
        return Err(AssertionViolation::with_default(msg, || {
            format!("Crew execution failed with task error: {error}")
        })
        .actual(error));
    }

    Ok(())
}

/// Assert that tasks ran in the expected order, by description.
///
/// # Errors
/// Returns a violation if the executed sequence differs
pub fn assert_task_sequence(
    crew_output: &CrewOutput,
    expected_sequence: &[&str],
    msg: Option<&str>,
) -> AssertResult {
    let actual: Vec<&str> = crew_output
        .tasks_output
        .iter()
        .map(|output| output.description.as_str())
        .collect();

    if actual == expected_sequence {
        return Ok(());
    }

    Err(AssertionViolation::with_default(msg, || {
        "Tasks were not executed in the expected sequence".to_owned()
    })
    .expected(format!("{expected_sequence:?}"))
    .actual(format!("{actual:?}")))
}

/// Assert that at least `min_agents` distinct agents contributed outputs.
///
/// # Errors
/// Returns a violation if fewer agents took part
pub fn assert_agent_collaboration(
    crew_output: &CrewOutput,
    min_agents: usize,
    msg: Option<&str>,
) -> AssertResult {
    let agents: BTreeSet<&str> = crew_output
        .tasks_output
        .iter()
        .map(|output| output.agent.as_str())
        .filter(|agent| !agent.is_empty())
        .collect();

    if agents.len() >= min_agents {
        return Ok(());
    }

    Err(AssertionViolation::with_default(msg, || {
        format!(
            "Expected at least {min_agents} collaborating agents, found {}",
            agents.len()
        )
    })
    .expected(min_agents.to_string())
    .actual(agents.len().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewcheck_core::TaskOutput;

    fn two_task_output() -> CrewOutput {
        CrewOutput::new(
            "article",
            vec![
                TaskOutput::new("Research", "notes", "Researcher"),
                TaskOutput::new("Write", "article", "Writer"),
            ],
        )
    }

    #[test]
    fn test_completed_with_empty_children_and_payload() {
        assert_crew_completed_successfully(&CrewOutput::new("done", Vec::new()), None).unwrap();
    }

    #[test]
    fn test_completed_fails_on_child_error() {
        let output = CrewOutput::new(
            "partial",
            vec![
                TaskOutput::new("Research", "notes", "Researcher"),
                TaskOutput::failed("Write", "Writer", "model timeout"),
            ],
        );
        let violation = assert_crew_completed_successfully(&output, None).unwrap_err();
        assert_eq!(
            violation.message,
            "Crew execution failed with task error: model timeout"
        );
    }

    #[test]
    fn test_completed_fails_on_empty_payload() {
        let violation = assert_crew_completed_successfully(&CrewOutput::default(), None).unwrap_err();
        assert_eq!(violation.message, "Crew execution produced no output");
    }

    #[test]
    fn test_task_sequence() {
        let output = two_task_output();
        assert_task_sequence(&output, &["Research", "Write"], None).unwrap();
        assert!(assert_task_sequence(&output, &["Write", "Research"], None).is_err());
        assert!(assert_task_sequence(&output, &["Research"], None).is_err());
    }

    #[test]
    fn test_agent_collaboration() {
        let output = two_task_output();
        assert_agent_collaboration(&output, 2, None).unwrap();
        let violation = assert_agent_collaboration(&output, 3, None).unwrap_err();
        assert_eq!(
            violation.message,
            "Expected at least 3 collaborating agents, found 2"
        );
    }
}
