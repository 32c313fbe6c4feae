// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for tool tests.

use crate::tool::ToolContext;
use smith_core::{AgentId, FakeClock};
use smith_safety::{AutoLevel, SafetyPolicy};
use smith_storage::Coordinator;
use std::path::Path;
use std::sync::Arc;

/// Context over a temp workspace with an in-memory coordinator and the
/// bundled policy at level high.
pub(crate) fn context(work_dir: &Path) -> ToolContext {
    context_at_level(work_dir, AutoLevel::High)
}

pub(crate) fn context_at_level(work_dir: &Path, level: AutoLevel) -> ToolContext {
    let coordinator = Coordinator::in_memory(Arc::new(FakeClock::new())).unwrap();
    ToolContext::new(
        work_dir.to_path_buf(),
        coordinator,
        SafetyPolicy::bundled().unwrap(),
        level,
        AgentId::new("implementation-1"),
    )
}

/// Write a file under the workspace, creating parents.
pub(crate) fn seed_file(work_dir: &Path, rel: &str, content: &str) -> std::path::PathBuf {
    let path = work_dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
