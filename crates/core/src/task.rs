// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task record and state machine.
//!
//! A task is the unit of work agents claim from the queue. Memory fields
//! (learnings, tried approaches, blockers, notes) survive failure so the
//! next agent to pick the task up starts with context.

use crate::id::{AgentId, SessionId, TaskId};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Backlog,
    Wip,
    Review,
    Done,
    Failed,
}

impl TaskStatus {
    /// Legal transitions of the task state machine.
    ///
    /// - backlog → wip (claim), backlog (no-op)
    /// - wip → done (complete), review, backlog (fail), failed
    /// - review → done, backlog (rework)
    /// - done is terminal
    /// - failed → backlog (explicit reopen)
    pub fn can_transition(self, to: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, to),
            (Backlog, Wip)
                | (Backlog, Backlog)
                | (Wip, Done)
                | (Wip, Review)
                | (Wip, Backlog)
                | (Wip, Failed)
                | (Review, Done)
                | (Review, Backlog)
                | (Failed, Backlog)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Backlog => write!(f, "backlog"),
            TaskStatus::Wip => write!(f, "wip"),
            TaskStatus::Review => write!(f, "review"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Scheduling priority. Higher sorts first; ties break oldest-first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Medium),
            2 => Ok(Priority::High),
            other => Err(format!("priority out of range: {}", other)),
        }
    }
}

/// Context retained across agent attempts at a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaskMemory {
    /// Free-text insights recorded by the last agent to touch the task.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub learnings: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tried_approaches: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, String>,
}

impl TaskMemory {
    pub fn is_empty(&self) -> bool {
        self.learnings.is_empty()
            && self.tried_approaches.is_empty()
            && self.blockers.is_empty()
            && self.notes.is_empty()
    }

    /// Merge another memory into this one. Learnings are replaced when the
    /// incoming text is non-empty; lists and notes accumulate.
    pub fn merge(&mut self, other: TaskMemory) {
        if !other.learnings.is_empty() {
            self.learnings = other.learnings;
        }
        self.tried_approaches.extend(other.tried_approaches);
        self.blockers.extend(other.blockers);
        self.notes.extend(other.notes);
    }
}

/// A unit of work in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub role: Role,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Tasks that must reach `done` before this one is claimable.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<TaskId>,
    pub session_id: SessionId,
    /// Owning agent while the task is wip; empty otherwise.
    #[serde(default)]
    pub agent_id: AgentId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "TaskMemory::is_empty")]
    pub memory: TaskMemory,
}

/// Fields supplied when creating a task. Id, status and timestamps are
/// assigned by the task store.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub title: String,
    pub description: String,
    pub role: Role,
    pub priority: Priority,
    pub depends_on: BTreeSet<TaskId>,
}

impl TaskSpec {
    pub fn new(title: impl Into<String>, description: impl Into<String>, role: Role) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            role,
            priority: Priority::default(),
            depends_on: BTreeSet::new(),
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn depends_on(mut self, ids: impl IntoIterator<Item = TaskId>) -> Self {
        self.depends_on = ids.into_iter().collect();
        self
    }
}

impl Task {
    /// Build a fresh backlog task from a spec.
    pub fn new(id: TaskId, spec: TaskSpec, session_id: SessionId, now_ms: u64) -> Self {
        Self {
            id,
            title: spec.title,
            description: spec.description,
            role: spec.role,
            status: TaskStatus::Backlog,
            priority: spec.priority,
            depends_on: spec.depends_on,
            session_id,
            agent_id: AgentId::default(),
            result: String::new(),
            error: String::new(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            completed_at_ms: None,
            memory: TaskMemory::default(),
        }
    }

    /// Whether the record satisfies the ownership invariant: wip and done
    /// tasks carry the agent that worked them.
    pub fn ownership_ok(&self) -> bool {
        !matches!(self.status, TaskStatus::Wip | TaskStatus::Done) || !self.agent_id.is_empty()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
