// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.

use smith_core::{AgentId, FakeClock};
use smith_provider::ScriptedProvider;
use smith_safety::{AutoLevel, SafetyPolicy};
use smith_storage::Coordinator;
use smith_tools::{ToolContext, ToolRegistry};
use std::path::Path;
use std::sync::Arc;

pub(crate) struct Fixture {
    pub coordinator: Coordinator,
    pub provider: Arc<ScriptedProvider>,
    pub registry: ToolRegistry,
    pub clock: Arc<FakeClock>,
}

impl Fixture {
    pub fn new() -> Self {
        let clock = Arc::new(FakeClock::new());
        let coordinator = Coordinator::in_memory(clock.clone()).unwrap();
        Self {
            coordinator,
            provider: Arc::new(ScriptedProvider::new()),
            registry: ToolRegistry::with_builtin_tools(),
            clock,
        }
    }

    pub fn context(&self, work_dir: &Path, agent: &str) -> ToolContext {
        ToolContext::new(
            work_dir.to_path_buf(),
            self.coordinator.clone(),
            SafetyPolicy::bundled().unwrap(),
            AutoLevel::High,
            AgentId::new(agent),
        )
    }
}
