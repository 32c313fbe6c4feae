// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds raised by the coordination core.

use crate::id::{AgentId, TaskId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced across the core. Tool and provider layers map these
/// into their own result shapes; the UI renders them directly.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("file locked by {agent_id} (task {task_id}): {path}")]
    LockHeld {
        path: PathBuf,
        agent_id: AgentId,
        task_id: TaskId,
    },
    #[error("path escapes workspace: {0}")]
    InvalidPath(PathBuf),
    #[error("denied by safety policy: {0}")]
    PolicyDenied(String),
    #[error("authentication required for provider {0}")]
    AuthRequired(String),
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("concurrent mutation lost the race: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether a caller may retry the operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Conflict(_) | CoreError::RateLimited | CoreError::Network(_)
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
