//! Scripted crew running tasks through mock agents.

use crate::agent::MockAgent;
use crewcheck_core::{Agent as _, Crew, CrewInputs, CrewOutput, Error, Result, Task, TaskOutput};
use std::collections::BTreeMap;

/// Sequential stand-in for a crew runtime.
///
/// Each task goes to the agent whose role matches the task's `agent` field,
/// or to the first agent when the task is unassigned. Problems with a single
/// task become an error detail on that task's child output; the run carries
/// on with the next task.
#[derive(Debug, Clone, Default)]
pub struct MockCrew {
    /// Agents available to the crew
    agents: Vec<MockAgent>,
    /// Tasks in execution order
    tasks: Vec<Task>,
    /// Scripted failures keyed by task description
    failures: BTreeMap<String, String>,
}

impl MockCrew {
    /// Create a crew from agents and tasks
    pub fn new(agents: Vec<MockAgent>, tasks: Vec<Task>) -> Self {
        Self {
            agents,
            tasks,
            failures: BTreeMap::new(),
        }
    }

    /// Make the task with this description fail with the given detail
    #[must_use]
    pub fn with_task_failure<D, E>(mut self, description: D, error: E) -> Self
    where
        D: Into<String>,
        E: Into<String>,
    {
        self.failures.insert(description.into(), error.into());
        self
    }

    /// Agents of the crew
    pub fn agents(&self) -> &[MockAgent] {
        &self.agents
    }

    /// Mutable access to the agents, e.g. to reset them between tests
    pub fn agents_mut(&mut self) -> &mut [MockAgent] {
        &mut self.agents
    }

    /// Find an agent by role
    pub fn agent(&self, role: &str) -> Option<&MockAgent> {
        self.agents.iter().find(|agent| agent.role() == role)
    }

    /// Tasks of the crew
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Swap the crew's agents for mock agents
    pub fn replace_agents(&mut self, agents: Vec<MockAgent>) {
        self.agents = agents;
    }

    fn run_task(&mut self, template: &str, task: &Task) -> TaskOutput {
        let scripted = self
            .failures
            .get(template)
            .or_else(|| self.failures.get(&task.description));
        if let Some(error) = scripted {
            let role = task.agent.clone().unwrap_or_default();
            return TaskOutput::failed(task.description.clone(), role, error.clone());
        }

        let position = match &task.agent {
            Some(role) => self.agents.iter().position(|agent| agent.role() == role),
            None if self.agents.is_empty() => None,
            None => Some(0),
        };

        match position {
            Some(index) => self.agents[index].execute(task),
            None => {
                let role = task.agent.clone().unwrap_or_default();
                let error = format!("No agent available for role {role:?}");
                TaskOutput::failed(task.description.clone(), role, error)
            }
        }
    }
}

/// Replace `{name}` placeholders with kickoff inputs
fn interpolate(template: &str, inputs: &CrewInputs) -> String {
    inputs
        .iter()
        .fold(template.to_owned(), |text, (key, value)| {
            text.replace(&format!("{{{key}}}"), value)
        })
}

impl Crew for MockCrew {
    fn kickoff(&mut self, inputs: &CrewInputs) -> Result<CrewOutput> {
        if self.tasks.is_empty() {
            return Err(Error::Setup("crew has no tasks".to_owned()));
        }

        let tasks = self.tasks.clone();
        let mut outputs = Vec::with_capacity(tasks.len());
        for template in &tasks {
            let task = Task {
                description: interpolate(&template.description, inputs),
                ..template.clone()
            };
            let output = self.run_task(&template.description, &task);
            if let Some(error) = &output.error {
                tracing::debug!("Mock crew task {:?} failed: {error}", task.description);
            }
            outputs.push(output);
        }

        let raw = outputs
            .last()
            .map(|output| output.raw.clone())
            .unwrap_or_default();

        Ok(CrewOutput::new(raw, outputs))
    }
}
