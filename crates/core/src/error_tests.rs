// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::{AgentId, TaskId};

#[test]
fn lock_held_names_the_owner() {
    let err = CoreError::LockHeld {
        path: PathBuf::from("/w/src/a.rs"),
        agent_id: AgentId::new("implementation-1"),
        task_id: TaskId::new("task-003"),
    };
    let text = err.to_string();
    assert!(text.contains("implementation-1"));
    assert!(text.contains("task-003"));
    assert!(text.contains("/w/src/a.rs"));
}

#[test]
fn retryable_kinds() {
    assert!(CoreError::Conflict("claim".to_string()).is_retryable());
    assert!(CoreError::RateLimited.is_retryable());
    assert!(CoreError::Network("timeout".to_string()).is_retryable());

    assert!(!CoreError::NotFound("task-001".to_string()).is_retryable());
    assert!(!CoreError::PolicyDenied("pipe to shell".to_string()).is_retryable());
}

#[test]
fn policy_denied_carries_reason() {
    let err = CoreError::PolicyDenied("pipe to shell".to_string());
    assert!(err.to_string().contains("pipe to shell"));
}
