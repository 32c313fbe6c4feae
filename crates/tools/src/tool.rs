// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`Tool`] trait, execution context, and result shape.

use async_trait::async_trait;
use smith_core::{AgentId, CoreError, Role, TaskId};
use smith_safety::{AutoLevel, SafetyPolicy};
use smith_storage::Coordinator;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a tool call hands back to the engine. Failures are data: the
/// LLM sees them and may recover.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub data: serde_json::Value,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            data: serde_json::Value::Null,
            error: None,
        }
    }

    pub fn ok_with_data(output: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            output: output.into(),
            data,
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            output: String::new(),
            data: serde_json::Value::Null,
            error: Some(error),
        }
    }

    /// Render for the conversation history: output on success, the
    /// error text otherwise.
    pub fn as_message(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            format!(
                "error: {}",
                self.error.as_deref().unwrap_or("unknown failure")
            )
        }
    }
}

impl From<Result<ToolResult, CoreError>> for ToolResult {
    fn from(result: Result<ToolResult, CoreError>) -> Self {
        match result {
            Ok(r) => r,
            Err(e) => ToolResult::fail(e.to_string()),
        }
    }
}

/// Ambient state tools execute against.
#[derive(Clone)]
pub struct ToolContext {
    /// Workspace root; every file path must resolve inside it.
    pub work_dir: PathBuf,
    pub coordinator: Coordinator,
    pub policy: SafetyPolicy,
    pub level: AutoLevel,
    /// Identity of the calling agent (or the chat session).
    pub agent_id: AgentId,
    pub role: Option<Role>,
    /// Task being worked; locks taken by file tools are owned by it.
    pub task_id: Option<TaskId>,
    /// Consultant for `consult_agent`; absent in contexts that cannot
    /// reach a provider.
    pub consultant: Option<Arc<dyn crate::task_tools::Consultant>>,
    cancelled: Arc<AtomicBool>,
}

impl ToolContext {
    pub fn new(
        work_dir: PathBuf,
        coordinator: Coordinator,
        policy: SafetyPolicy,
        level: AutoLevel,
        agent_id: AgentId,
    ) -> Self {
        Self {
            work_dir,
            coordinator,
            policy,
            level,
            agent_id,
            role: None,
            task_id: None,
            consultant: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_consultant(mut self, consultant: Arc<dyn crate::task_tools::Consultant>) -> Self {
        self.consultant = Some(consultant);
        self
    }

    /// Lock id used when this context takes file locks: the current
    /// task, or an empty id for the foreground chat session.
    pub fn lock_task_id(&self) -> TaskId {
        self.task_id.clone().unwrap_or_default()
    }

    /// Signal long-running tools (search, command) to stop at the next
    /// safe point.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Acquire the lock on `path` for this context's identity, mapping
    /// contention to a tool-visible error.
    pub fn lock_file(&self, path: &std::path::Path) -> Result<(), CoreError> {
        self.coordinator
            .locks
            .acquire(path, &self.agent_id, &self.lock_task_id())
            .map(|_| ())
    }
}

/// A named capability invocable by the LLM.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema object describing the accepted parameters.
    fn parameters(&self) -> serde_json::Value;

    /// Cheap structural check, run before execution.
    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError>;

    /// Whether a UI prompt must interpose at the given level. Read-only
    /// tools never confirm; mutating tools confirm below their tier.
    fn requires_confirmation(&self, _level: AutoLevel) -> bool {
        false
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult;
}

/// Parse a tool's params struct, mapping malformed input to
/// `InvalidState` with the tool's name in the message.
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(
    tool: &str,
    params: &serde_json::Value,
) -> Result<T, CoreError> {
    serde_json::from_value(params.clone())
        .map_err(|e| CoreError::InvalidState(format!("{}: invalid params: {}", tool, e)))
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
