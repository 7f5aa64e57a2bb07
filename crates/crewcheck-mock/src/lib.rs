//! Deterministic substitutes for agents, tools, crews and evaluators.
//!
//! Real agent and tool invocations depend on external model calls. The
//! types here replay scripted content instead and record every interaction,
//! so tests can assert both on what came back and on what was called.

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

mod agent;
mod crew;
mod evaluator;
mod tool;

pub use agent::{
    DEFAULT_RESPONSE, DEFAULT_ROLE, ExecutionRecord, MockAgent, MockAgentConfig, ToolCallRecord,
};
pub use crew::MockCrew;
pub use evaluator::{EvaluationRequest, MockEvaluator};
pub use tool::{
    CallRecord, DEFAULT_TOOL_NAME, DEFAULT_TOOL_RESULT, MockTool, MockToolConfig, SideEffect,
};

use std::sync::Arc;

/// Create a mock agent together with its mock tools.
///
/// The returned handles share state with the tools attached to the agent,
/// so calls made through the agent are visible on them.
pub fn create_mock_agent_with_tools(
    agent_config: MockAgentConfig,
    tool_configs: Vec<MockToolConfig>,
) -> (MockAgent, Vec<Arc<MockTool>>) {
    let tools: Vec<Arc<MockTool>> = tool_configs
        .into_iter()
        .map(|config| Arc::new(MockTool::from_config(config)))
        .collect();

    let agent = tools
        .iter()
        .fold(MockAgent::from_config(agent_config), |agent, tool| {
            agent.with_tool(Arc::clone(tool))
        });

    (agent, tools)
}

/// Replace the agents of a crew with mock agents.
pub fn patch_crew_agents(crew: &mut MockCrew, mock_agents: Vec<MockAgent>) {
    crew.replace_agents(mock_agents);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewcheck_core::{Tool as _, ToolKwargs};
    use serde_json::json;

    #[test]
    fn test_agent_with_tools_shares_handles() {
        let (agent, tools) = create_mock_agent_with_tools(
            MockAgentConfig {
                role: "Researcher".to_owned(),
                ..MockAgentConfig::default()
            },
            vec![
                MockToolConfig {
                    name: "search".to_owned(),
                    ..MockToolConfig::default()
                },
                MockToolConfig::default(),
            ],
        );

        assert_eq!(agent.tools().len(), 2);
        assert_eq!(tools[0].name(), "search");

        agent.tools()[0].invoke(&[json!("rust")], &ToolKwargs::new());
        assert!(tools[0].was_called());
        assert!(agent.used_tool("search"));
    }
}
