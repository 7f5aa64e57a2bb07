//! Loader turning JSON modules into runnable test classes.

use super::fixture::{Check, FixtureClass, FixtureKind, FixtureModule, FixtureStep};
use super::loader::{ModuleLoader, SourceFile};
use crate::base::{AgentTestCase, CrewTestCase};
use crate::case::{BaseCase as _, InstanceFactory, TestClass, TestFault, TestInstance, TestResult};
use core::result::Result as CoreResult;
use crewcheck_assert::{
    AssertionViolation, assert_agent_called_tool, assert_agent_collaboration,
    assert_agent_response_contains, assert_agent_response_quality,
    assert_crew_completed_successfully, assert_crew_output_matches, assert_output_format,
    assert_task_sequence, assert_tool_call_count, assert_tool_called_with,
};
use crewcheck_core::{Agent as _, CrewOutput, Error, QualityEvaluator, Result, Task, Tool as _};
use crewcheck_mock::{MockAgent, MockTool};
use serde_json::from_str;
use std::fmt;
use std::fs;
use std::rc::Rc;
use std::sync::Arc;

/// Loads declarative JSON test modules.
#[derive(Clone, Default)]
pub struct FixtureLoader {
    /// Evaluator used by quality checks
    evaluator: Option<Arc<dyn QualityEvaluator>>,
}

impl FixtureLoader {
    /// Create a loader without a quality evaluator
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this evaluator for quality checks
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Arc<dyn QualityEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Build the runnable class for a fixture class
    pub fn class(&self, fixture: FixtureClass) -> TestClass {
        let name = fixture.name.clone();
        let category = fixture.kind.category();
        let methods = fixture.tests.iter().map(|test| test.name.clone()).collect();

        let fixture = Rc::new(fixture);
        let evaluator = self.evaluator.clone();
        let factory: InstanceFactory = Rc::new(move || -> Box<dyn TestInstance> {
            Box::new(FixtureInstance::new(Rc::clone(&fixture), evaluator.clone()))
        });

        TestClass::new(name, category, methods, factory)
    }
}

impl ModuleLoader for FixtureLoader {
    fn load(&self, source: &SourceFile) -> Result<Vec<TestClass>> {
        let contents = fs::read_to_string(source.path())?;
        let module: FixtureModule = from_str(&contents)
            .map_err(|err| Error::load(source.path().display().to_string(), err.to_string()))?;

        tracing::debug!(
            "Parsed {} class(es) from {:?}",
            module.classes.len(),
            source.relative()
        );

        Ok(module
            .classes
            .into_iter()
            .map(|class| self.class(class))
            .collect())
    }
}

impl fmt::Debug for FixtureLoader {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FixtureLoader")
            .field("has_evaluator", &self.evaluator.is_some())
            .finish()
    }
}

/// Scaffold a fixture instance runs on.
enum Scaffold {
    Agent(AgentTestCase),
    Crew(CrewTestCase),
}

/// One fresh instance of a fixture class.
struct FixtureInstance {
    fixture: Rc<FixtureClass>,
    evaluator: Option<Arc<dyn QualityEvaluator>>,
    scaffold: Scaffold,
    tools: Vec<Arc<MockTool>>,
}

fn missing_output() -> TestFault {
    TestFault::Failure(AssertionViolation::new(
        "No output to check; run an execute or kickoff step first",
    ))
}

impl FixtureInstance {
    fn new(fixture: Rc<FixtureClass>, evaluator: Option<Arc<dyn QualityEvaluator>>) -> Self {
        let scaffold = match fixture.kind {
            FixtureKind::Crew => Scaffold::Crew(CrewTestCase::default()),
            FixtureKind::Agent | FixtureKind::Other => Scaffold::Agent(AgentTestCase::default()),
        };
        Self {
            fixture,
            evaluator,
            scaffold,
            tools: Vec::new(),
        }
    }

    fn build_agents(&self) -> CoreResult<Vec<MockAgent>, TestFault> {
        self.fixture
            .agents
            .iter()
            .map(|config| {
                config.tools.iter().try_fold(
                    MockAgent::from_config(config.clone()),
                    |agent, name| {
                        let tool = self.tool(name).map_err(|_| {
                            TestFault::error(format!(
                                "Agent {:?} uses undeclared tool {name:?}",
                                config.role
                            ))
                        })?;
                        Ok(agent.with_tool(Arc::clone(tool)))
                    },
                )
            })
            .collect()
    }

    fn tool(&self, name: &str) -> CoreResult<&Arc<MockTool>, TestFault> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| TestFault::error(format!("Unknown tool {name:?}")))
    }

    fn agent(&self, role: Option<&str>) -> CoreResult<&MockAgent, TestFault> {
        let found = match (&self.scaffold, role) {
            (Scaffold::Agent(case), None) => case.agent(),
            (Scaffold::Agent(case), Some(role)) => case.agent().filter(|agent| agent.role() == role),
            (Scaffold::Crew(case), Some(role)) => case.agent(role),
            (Scaffold::Crew(case), None) => case.agents().first(),
        };
        found.ok_or_else(|| TestFault::error(format!("Unknown agent {:?}", role.unwrap_or("<first>"))))
    }

    fn agents_mut(&mut self) -> Vec<&mut MockAgent> {
        match &mut self.scaffold {
            Scaffold::Agent(case) => case.agent_mut().into_iter().collect(),
            Scaffold::Crew(case) => match case.crew_mut() {
                Some(crew) => crew.agents_mut().iter_mut().collect(),
                None => Vec::new(),
            },
        }
    }

    fn agent_mut(&mut self, role: Option<&str>) -> CoreResult<&mut MockAgent, TestFault> {
        let mut agents = self.agents_mut().into_iter();
        let found = match role {
            Some(role) => agents.find(|agent| agent.role() == role),
            None => agents.next(),
        };
        found.ok_or_else(|| TestFault::error(format!("Unknown agent {:?}", role.unwrap_or("<first>"))))
    }

    fn output_text(&self) -> CoreResult<String, TestFault> {
        let raw = match &self.scaffold {
            Scaffold::Agent(case) => case.last_agent_output().map(|output| output.raw.clone()),
            Scaffold::Crew(case) => case.last_crew_output().map(|output| output.raw.clone()),
        };
        raw.ok_or_else(missing_output)
    }

    fn crew_output(&self) -> CoreResult<&CrewOutput, TestFault> {
        match &self.scaffold {
            Scaffold::Crew(case) => case.last_crew_output().ok_or_else(missing_output),
            Scaffold::Agent(_) => Err(TestFault::error("Crew checks need a crew class")),
        }
    }

    /// Task the most recent output answered
    fn evaluated_task(&self) -> CoreResult<Task, TestFault> {
        match &self.scaffold {
            Scaffold::Agent(case) => case.tasks().last().cloned().ok_or_else(missing_output),
            Scaffold::Crew(case) => {
                let last = self.crew_output()?.tasks_output.last().ok_or_else(missing_output)?;
                let mut task = Task::new(last.description.clone());
                task.expected_output = case
                    .tasks()
                    .last()
                    .and_then(|configured| configured.expected_output.clone());
                Ok(task)
            }
        }
    }

    fn step(&mut self, step: &FixtureStep) -> TestResult {
        match step {
            FixtureStep::Execute {
                task,
                expected_output,
            } => {
                let Scaffold::Agent(case) = &mut self.scaffold else {
                    return Err(TestFault::error("Execute steps need an agent class"));
                };
                let task = case.create_test_task(task.as_str(), expected_output.as_deref())?;
                case.execute_agent_task(&task)?;
            }
            FixtureStep::Kickoff { inputs } => {
                let Scaffold::Crew(case) = &mut self.scaffold else {
                    return Err(TestFault::error("Kickoff steps need a crew class"));
                };
                case.execute_crew(inputs)?;
            }
            FixtureStep::CallTool { tool, args, kwargs } => {
                self.tool(tool)?.invoke(args, kwargs);
            }
            FixtureStep::SimulateToolCall {
                agent,
                tool,
                parameters,
                result,
            } => {
                self.agent_mut(agent.as_deref())?.simulate_tool_call(
                    tool.as_str(),
                    parameters.clone(),
                    result.clone(),
                );
            }
            FixtureStep::Reset => {
                for agent in self.agents_mut() {
                    agent.reset();
                }
                for tool in &self.tools {
                    tool.reset();
                }
            }
            FixtureStep::Assert(assertion) => {
                self.check(&assertion.check, assertion.message.as_deref())?;
            }
        }
        Ok(())
    }

    fn check(&self, check: &Check, msg: Option<&str>) -> TestResult {
        match check {
            Check::Contains {
                text,
                case_sensitive,
            } => {
                let output = self.output_text()?;
                assert_agent_response_contains(output.as_str(), text, *case_sensitive, msg)?;
            }
            Check::Format { format } => {
                assert_output_format(self.output_text()?.as_str(), format, msg)?;
            }
            Check::Matches { pattern, regex } => {
                assert_crew_output_matches(self.output_text()?.as_str(), pattern, *regex, msg)?;
            }
            Check::CrewCompleted => {
                assert_crew_completed_successfully(self.crew_output()?, msg)?;
            }
            Check::TaskSequence { tasks } => {
                let expected: Vec<&str> = tasks.iter().map(String::as_str).collect();
                assert_task_sequence(self.crew_output()?, &expected, msg)?;
            }
            Check::Collaboration { min_agents } => {
                assert_agent_collaboration(self.crew_output()?, *min_agents, msg)?;
            }
            Check::AgentCalledTool { agent, tool } => {
                assert_agent_called_tool(self.agent(agent.as_deref())?, tool, msg)?;
            }
            Check::ToolCalledWith { tool, args, kwargs } => {
                assert_tool_called_with(self.tool(tool)?, args, kwargs, msg)?;
            }
            Check::ToolCallCount { tool, count } => {
                assert_tool_call_count(self.tool(tool)?, *count, msg)?;
            }
            Check::Quality { min_score } => {
                let evaluator = self
                    .evaluator
                    .as_ref()
                    .ok_or_else(|| TestFault::error("Quality checks need an evaluator"))?;
                let output = self.output_text()?;
                let task = self.evaluated_task()?;
                let score = assert_agent_response_quality(
                    output.as_str(),
                    &task,
                    *min_score,
                    &**evaluator,
                    msg,
                )?;
                tracing::debug!("Quality score {:?}: {}", score.score, score.feedback);
            }
            Check::ExecutionCount { agent, count } => {
                let agent = self.agent(agent.as_deref())?;
                let actual = agent.execution_history().len();
                if actual != *count {
                    let message = msg.map_or_else(
                        || {
                            format!(
                                "Agent '{}' executed {actual} task(s), expected {count}",
                                agent.role()
                            )
                        },
                        ToOwned::to_owned,
                    );
                    return Err(AssertionViolation::new(message)
                        .expected(count.to_string())
                        .actual(actual.to_string())
                        .into());
                }
            }
        }
        Ok(())
    }
}

impl TestInstance for FixtureInstance {
    fn set_up(&mut self) -> TestResult {
        self.tools = self
            .fixture
            .tools
            .iter()
            .map(|config| Arc::new(MockTool::from_config(config.clone())))
            .collect();
        let agents = self.build_agents()?;

        match &mut self.scaffold {
            Scaffold::Agent(case) => {
                case.set_up()?;
                let agent = agents.into_iter().next().ok_or_else(|| {
                    TestFault::error(format!("{} declares no agents", self.fixture.name))
                })?;
                case.set_agent(agent);
            }
            Scaffold::Crew(case) => {
                case.set_up()?;
                for agent in agents {
                    case.add_mock_agent(agent);
                }
                for task in &self.fixture.tasks {
                    case.add_test_task(
                        task.description.as_str(),
                        task.expected_output.as_deref(),
                        task.agent.as_deref(),
                    );
                }
                case.create_test_crew()?;
            }
        }
        Ok(())
    }

    fn run(&mut self, method: &str) -> TestResult {
        let fixture = Rc::clone(&self.fixture);
        let test = fixture
            .tests
            .iter()
            .find(|test| test.name == method)
            .ok_or_else(|| TestFault::error(format!("{} has no method {method:?}", fixture.name)))?;

        for step in &test.steps {
            self.step(step)?;
        }
        Ok(())
    }

    fn tear_down(&mut self) -> TestResult {
        self.tools.clear();
        match &mut self.scaffold {
            Scaffold::Agent(case) => case.tear_down(),
            Scaffold::Crew(case) => case.tear_down(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::Category;
    use crewcheck_mock::MockEvaluator;
    use std::path::Path;
    use tempfile::TempDir;

    fn load(contents: &str, loader: &FixtureLoader) -> Result<Vec<TestClass>> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test_module.json");
        fs::write(&path, contents).unwrap();
        loader.load(&SourceFile::new(temp.path(), path))
    }

    fn run(class: &TestClass, method: &str) -> TestResult {
        let mut instance = class.instantiate();
        instance.set_up()?;
        let outcome = instance.run(method);
        instance.tear_down()?;
        outcome
    }

    const AGENT_MODULE: &str = r#"{
        "classes": [{
            "name": "ResearcherTests",
            "kind": "agent",
            "agents": [{"role": "Researcher", "responses": ["Rust is FAST", "{\"ok\": true}"], "tools": ["search"]}],
            "tools": [{"name": "search", "return_value": "3 hits"}],
            "tests": [
                {"name": "test_contains", "steps": [
                    {"type": "execute", "task": "Describe Rust"},
                    {"type": "assert", "check": "contains", "text": "fast"},
                    {"type": "execute", "task": "Report as JSON"},
                    {"type": "assert", "check": "format", "format": "json"},
                    {"type": "assert", "check": "execution_count", "count": 2}
                ]},
                {"name": "test_tools", "steps": [
                    {"type": "call_tool", "tool": "search", "args": ["rust"], "kwargs": {"limit": 3}},
                    {"type": "assert", "check": "agent_called_tool", "tool": "search"},
                    {"type": "assert", "check": "tool_called_with", "tool": "search", "args": ["rust"], "kwargs": {"limit": 3}},
                    {"type": "reset"},
                    {"type": "assert", "check": "tool_call_count", "tool": "search", "count": 0}
                ]},
                {"name": "test_wrong_content", "steps": [
                    {"type": "execute", "task": "Describe Rust"},
                    {"type": "assert", "check": "contains", "text": "slow", "message": "expected slow"}
                ]},
                {"name": "test_no_output", "steps": [
                    {"type": "assert", "check": "contains", "text": "anything"}
                ]},
                {"name": "test_unknown_tool", "steps": [
                    {"type": "call_tool", "tool": "calculator"}
                ]},
                {"name": "test_quality", "steps": [
                    {"type": "execute", "task": "Describe Rust", "expected_output": "A description"},
                    {"type": "assert", "check": "quality", "min_score": 7.0}
                ]}
            ]
        }]
    }"#;

    #[test]
    fn test_agent_class_metadata() {
        let classes = load(AGENT_MODULE, &FixtureLoader::new()).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name(), "ResearcherTests");
        assert_eq!(classes[0].category(), Category::AgentTest);
        assert_eq!(classes[0].methods()[0], "test_contains");
    }

    #[test]
    fn test_agent_steps_outcomes() {
        let classes = load(AGENT_MODULE, &FixtureLoader::new()).unwrap();
        let class = &classes[0];

        run(class, "test_contains").unwrap();
        run(class, "test_tools").unwrap();

        match run(class, "test_wrong_content") {
            Err(TestFault::Failure(violation)) => assert_eq!(violation.message, "expected slow"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(matches!(run(class, "test_no_output"), Err(TestFault::Failure(_))));
        assert!(matches!(run(class, "test_unknown_tool"), Err(TestFault::Error(_))));
        assert!(matches!(run(class, "test_quality"), Err(TestFault::Error(_))));
        assert!(matches!(run(class, "test_missing"), Err(TestFault::Error(_))));
    }

    #[test]
    fn test_quality_with_evaluator() {
        let evaluator = Arc::new(MockEvaluator::new(Some(4.0), "too vague"));
        let loader = FixtureLoader::new().with_evaluator(Arc::clone(&evaluator) as Arc<dyn QualityEvaluator>);
        let classes = load(AGENT_MODULE, &loader).unwrap();

        let fault = run(&classes[0], "test_quality").unwrap_err();
        assert!(matches!(fault, TestFault::Failure(_)));
        assert!(fault.detail().contains("too vague"));

        let requests = evaluator.requests();
        assert_eq!(requests[0].task_description, "Describe Rust");
        assert_eq!(requests[0].expected_output, "A description");
    }

    #[test]
    fn test_crew_class() {
        let module = r##"{
            "classes": [{
                "name": "PipelineTests",
                "kind": "crew",
                "agents": [
                    {"role": "Researcher", "responses": ["findings"]},
                    {"role": "Writer", "responses": ["# Article"]}
                ],
                "tasks": [
                    {"description": "Research {topic}"},
                    {"description": "Write about {topic}", "agent": "Writer"}
                ],
                "tests": [
                    {"name": "test_pipeline", "steps": [
                        {"type": "kickoff", "inputs": {"topic": "Rust"}},
                        {"type": "assert", "check": "crew_completed"},
                        {"type": "assert", "check": "task_sequence", "tasks": ["Research Rust", "Write about Rust"]},
                        {"type": "assert", "check": "collaboration", "min_agents": 2},
                        {"type": "assert", "check": "format", "format": "markdown"},
                        {"type": "assert", "check": "execution_count", "agent": "Writer", "count": 1},
                        {"type": "assert", "check": "execution_count", "count": 1},
                        {"type": "simulate_tool_call", "agent": "Writer", "tool": "spellcheck", "result": "ok"},
                        {"type": "assert", "check": "agent_called_tool", "agent": "Writer", "tool": "spellcheck"}
                    ]},
                    {"name": "test_execute_in_crew", "steps": [
                        {"type": "execute", "task": "Go"}
                    ]}
                ]
            }]
        }"##;
        let classes = load(module, &FixtureLoader::new()).unwrap();
        assert_eq!(classes[0].category(), Category::CrewTest);
        run(&classes[0], "test_pipeline").unwrap();
        assert!(matches!(
            run(&classes[0], "test_execute_in_crew"),
            Err(TestFault::Error(_))
        ));
    }

    #[test]
    fn test_undeclared_tool_fails_setup() {
        let module = r#"{"classes": [{
            "name": "BrokenTests",
            "kind": "agent",
            "agents": [{"role": "Researcher", "tools": ["search"]}],
            "tests": [{"name": "test_anything"}]
        }]}"#;
        let classes = load(module, &FixtureLoader::new()).unwrap();
        let mut instance = classes[0].instantiate();
        assert!(matches!(instance.set_up(), Err(TestFault::Error(_))));
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let error = load("{\"classes\": [", &FixtureLoader::new()).unwrap_err();
        assert!(matches!(error, Error::Load { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = SourceFile::new(Path::new("/"), Path::new("/nonexistent/test_x.json").to_path_buf());
        let error = FixtureLoader::new().load(&source).unwrap_err();
        assert!(matches!(error, Error::Io(_)));
    }
}
