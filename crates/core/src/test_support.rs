// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::id::{SessionId, TaskId};
use crate::role::Role;
use crate::task::{Task, TaskSpec, TaskStatus};

/// A backlog task with fixed timestamps, for store-level tests.
pub fn backlog_task(id: &str, role: Role) -> Task {
    Task::new(
        TaskId::new(id),
        TaskSpec::new(format!("title for {}", id), "test description", role),
        SessionId::new("session-2026-08-01-001"),
        1_000_000,
    )
}

/// A task forced into the given status with a plausible owner.
pub fn task_in_status(id: &str, role: Role, status: TaskStatus) -> Task {
    let mut task = backlog_task(id, role);
    task.status = status;
    if matches!(status, TaskStatus::Wip | TaskStatus::Done) {
        task.agent_id = format!("{}-test0001", role).into();
    }
    if status == TaskStatus::Done {
        task.completed_at_ms = Some(1_000_500);
    }
    task
}
