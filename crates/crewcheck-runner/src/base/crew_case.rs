//! Scaffolding for testing multi-agent workflows end to end.

use crate::case::{BaseCase, Category, TestResult};
use crewcheck_assert::{
    AssertResult, assert_agent_collaboration, assert_crew_completed_successfully,
    assert_crew_output_matches, assert_output_format, assert_task_sequence,
};
use crewcheck_core::{Agent as _, Crew as _, CrewInputs, CrewOutput, Error, Result, Task, TaskOutput};
use crewcheck_mock::{MockAgent, MockAgentConfig, MockCrew};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Execution metrics of one crew run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CrewMetrics {
    /// Tasks configured on the test case
    pub total_tasks: usize,
    /// Child outputs without an error detail
    pub successful_tasks: usize,
    /// Number of child outputs produced by each agent role
    pub agent_utilization: BTreeMap<String, usize>,
}

/// Base for crew test types.
#[derive(Debug, Default)]
pub struct CrewTestCase {
    /// Crew built by [`Self::create_test_crew`]
    crew: Option<MockCrew>,
    /// Agents added so far
    test_agents: Vec<MockAgent>,
    /// Tasks added so far
    test_tasks: Vec<Task>,
    /// Outputs captured by [`Self::execute_crew`]
    crew_outputs: Vec<CrewOutput>,
}

impl CrewTestCase {
    /// Add a mock agent with scripted responses
    pub fn add_test_agent<R, I, T>(&mut self, role: R, responses: I) -> &mut MockAgent
    where
        R: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.add_mock_agent(MockAgent::new(role).with_responses(responses))
    }

    /// Add a fully configured mock agent
    pub fn add_mock_agent(&mut self, agent: MockAgent) -> &mut MockAgent {
        let index = self.test_agents.len();
        self.test_agents.push(agent);
        &mut self.test_agents[index]
    }

    /// Add a task; unassigned tasks go to the first agent
    pub fn add_test_task<T: Into<String>>(
        &mut self,
        description: T,
        expected_output: Option<&str>,
        agent: Option<&str>,
    ) -> Task {
        let role = agent
            .map(ToOwned::to_owned)
            .or_else(|| self.test_agents.first().map(|first| first.role().to_owned()));

        let mut task = Task::new(description);
        task.expected_output = expected_output.map(ToOwned::to_owned);
        task.agent = role;
        self.test_tasks.push(task.clone());
        task
    }

    /// Build the crew from the agents and tasks added so far
    ///
    /// # Errors
    /// Returns an error if no agents or no tasks were added
    pub fn create_test_crew(&mut self) -> Result<&mut MockCrew> {
        if self.test_agents.is_empty() {
            return Err(Error::Setup(
                "no agents available, add agents first".to_owned(),
            ));
        }
        if self.test_tasks.is_empty() {
            return Err(Error::Setup("no tasks available, add tasks first".to_owned()));
        }

        let crew = MockCrew::new(self.test_agents.clone(), self.test_tasks.clone());
        Ok(self.crew.insert(crew))
    }

    /// Kick off the crew and capture its output
    ///
    /// # Errors
    /// Returns an error if no crew was created or the crew cannot run
    pub fn execute_crew(&mut self, inputs: &CrewInputs) -> Result<CrewOutput> {
        let crew = self.crew.as_mut().ok_or_else(|| {
            Error::Setup("no crew available for execution, create a crew first".to_owned())
        })?;
        let output = crew.kickoff(inputs)?;
        self.crew_outputs.push(output.clone());
        Ok(output)
    }

    /// Add a group of agents and tasks in one go.
    ///
    /// Tasks without an assigned agent are spread round-robin over the
    /// scenario's agents.
    pub fn create_collaborative_scenario(
        &mut self,
        scenario_name: &str,
        agent_configs: Vec<MockAgentConfig>,
        task_configs: Vec<Task>,
    ) -> (Vec<MockAgent>, Vec<Task>) {
        let agents: Vec<MockAgent> = agent_configs
            .into_iter()
            .map(|config| self.add_mock_agent(MockAgent::from_config(config)).clone())
            .collect();

        let tasks = task_configs
            .into_iter()
            .enumerate()
            .map(|(index, task)| {
                let role = task.agent.clone().or_else(|| {
                    (!agents.is_empty()).then(|| agents[index % agents.len()].role().to_owned())
                });
                self.add_test_task(task.description, task.expected_output.as_deref(), role.as_deref())
            })
            .collect();

        tracing::debug!(
            "Created scenario {scenario_name:?} with {} agent(s)",
            agents.len()
        );

        (agents, tasks)
    }

    /// Crew built for the current test
    pub fn crew(&self) -> Option<&MockCrew> {
        self.crew.as_ref()
    }

    /// Mutable crew built for the current test
    pub fn crew_mut(&mut self) -> Option<&mut MockCrew> {
        self.crew.as_mut()
    }

    /// Agents of the test, taken from the crew once it exists
    pub fn agents(&self) -> &[MockAgent] {
        self.crew
            .as_ref()
            .map_or(self.test_agents.as_slice(), MockCrew::agents)
    }

    /// Tasks added so far
    pub fn tasks(&self) -> &[Task] {
        &self.test_tasks
    }

    /// Agent with this role, taken from the crew once it exists
    pub fn agent(&self, role: &str) -> Option<&MockAgent> {
        match &self.crew {
            Some(crew) => crew.agent(role),
            None => self.test_agents.iter().find(|agent| agent.role() == role),
        }
    }

    /// Mutable agent with this role, taken from the crew once it exists
    pub fn agent_mut(&mut self, role: &str) -> Option<&mut MockAgent> {
        let agents = match &mut self.crew {
            Some(crew) => crew.agents_mut(),
            None => self.test_agents.as_mut_slice(),
        };
        agents.iter_mut().find(|agent| agent.role() == role)
    }

    /// Outputs captured during the current test
    pub fn crew_outputs(&self) -> &[CrewOutput] {
        &self.crew_outputs
    }

    /// Most recent captured output
    pub fn last_crew_output(&self) -> Option<&CrewOutput> {
        self.crew_outputs.last()
    }

    /// Child outputs of the given crew output, or of the most recent one
    pub fn crew_task_outputs<'case>(
        &'case self,
        crew_output: Option<&'case CrewOutput>,
    ) -> &'case [TaskOutput] {
        crew_output
            .or_else(|| self.last_crew_output())
            .map(|output| output.tasks_output.as_slice())
            .unwrap_or_default()
    }

    /// Count tasks, successful child outputs and per-agent work
    pub fn measure_crew_performance(&self, crew_output: &CrewOutput) -> CrewMetrics {
        let mut agent_utilization = BTreeMap::new();
        for output in &crew_output.tasks_output {
            *agent_utilization.entry(output.agent.clone()).or_insert(0) += 1;
        }

        CrewMetrics {
            total_tasks: self.test_tasks.len(),
            successful_tasks: crew_output
                .tasks_output
                .iter()
                .filter(|output| output.is_success())
                .count(),
            agent_utilization,
        }
    }

    /// See [`assert_crew_completed_successfully`]
    ///
    /// # Errors
    /// Returns a violation if the crew output is empty or a task failed
    pub fn assert_crew_completed_successfully(
        &self,
        crew_output: &CrewOutput,
        msg: Option<&str>,
    ) -> AssertResult {
        assert_crew_completed_successfully(crew_output, msg)
    }

    /// See [`assert_crew_output_matches`]
    ///
    /// # Errors
    /// Returns a violation if the pattern is not found
    pub fn assert_crew_output_matches(
        &self,
        crew_output: &CrewOutput,
        expected_pattern: &str,
        regex: bool,
        msg: Option<&str>,
    ) -> AssertResult {
        assert_crew_output_matches(crew_output, expected_pattern, regex, msg)
    }

    /// See [`assert_output_format`]
    ///
    /// # Errors
    /// Returns a violation if the output is not in the given format
    pub fn assert_crew_output_format(
        &self,
        crew_output: &CrewOutput,
        format_type: &str,
        msg: Option<&str>,
    ) -> AssertResult {
        assert_output_format(crew_output, format_type, msg)
    }

    /// See [`assert_agent_collaboration`]
    ///
    /// # Errors
    /// Returns a violation if fewer agents took part
    pub fn assert_agent_collaboration(
        &self,
        crew_output: &CrewOutput,
        min_agents: usize,
        msg: Option<&str>,
    ) -> AssertResult {
        assert_agent_collaboration(crew_output, min_agents, msg)
    }

    /// See [`assert_task_sequence`]
    ///
    /// # Errors
    /// Returns a violation if tasks ran in a different order
    pub fn assert_task_sequence(
        &self,
        crew_output: &CrewOutput,
        expected_sequence: &[&str],
        msg: Option<&str>,
    ) -> AssertResult {
        assert_task_sequence(crew_output, expected_sequence, msg)
    }
}

impl BaseCase for CrewTestCase {
    const CATEGORY: Category = Category::CrewTest;

    fn set_up(&mut self) -> TestResult {
        *self = Self::default();
        Ok(())
    }

    fn tear_down(&mut self) -> TestResult {
        self.crew = None;
        self.test_agents.clear();
        self.test_tasks.clear();
        self.crew_outputs.clear();
        Ok(())
    }
}
