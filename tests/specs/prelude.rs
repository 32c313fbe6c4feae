//! Shared fixture for the behavioral specs.

use smith_core::{AgentId, FakeClock};
use smith_safety::{AutoLevel, SafetyPolicy};
use smith_storage::Coordinator;
use smith_tools::ToolContext;
use std::path::Path;
use std::sync::Arc;

pub struct World {
    pub coordinator: Coordinator,
    pub clock: Arc<FakeClock>,
}

impl World {
    /// In-memory store, fake clock pinned to 2026-08-01.
    pub fn new() -> Self {
        let clock = Arc::new(FakeClock::at(1_785_542_400_000));
        let coordinator = Coordinator::in_memory(clock.clone()).unwrap();
        World { coordinator, clock }
    }

    /// Tool context for `agent` over `work_dir`, at level high unless
    /// the spec says otherwise.
    pub fn tool_ctx(&self, work_dir: &Path, agent: &str, level: AutoLevel) -> ToolContext {
        ToolContext::new(
            work_dir.to_path_buf(),
            self.coordinator.clone(),
            SafetyPolicy::bundled().unwrap(),
            level,
            AgentId::new(agent),
        )
    }
}

pub fn chat_agent() -> AgentId {
    AgentId::new("chat")
}
