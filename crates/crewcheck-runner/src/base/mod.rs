//! Setup/teardown scaffolding test types build on.

mod agent_case;
mod crew_case;

pub use agent_case::AgentTestCase;
pub use crew_case::{CrewMetrics, CrewTestCase};
