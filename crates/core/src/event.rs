// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event log types.
//!
//! Events record every state change for the UI sidebar and for
//! agent-to-agent wakeups. Ids are assigned on publish, strictly
//! increasing and dense, so a subscriber can replay exactly-once from
//! any watermark.

use crate::id::{AgentId, TaskId};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Closed set of event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TaskCreated,
    TaskClaimed,
    TaskUpdated,
    TaskCompleted,
    TaskFailed,
    FileLocked,
    FileUnlocked,
    AgentRegistered,
    AgentHeartbeat,
    AgentMessage,
    AgentQuestion,
    AgentResponse,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::TaskCreated => "task_created",
            EventType::TaskClaimed => "task_claimed",
            EventType::TaskUpdated => "task_updated",
            EventType::TaskCompleted => "task_completed",
            EventType::TaskFailed => "task_failed",
            EventType::FileLocked => "file_locked",
            EventType::FileUnlocked => "file_unlocked",
            EventType::AgentRegistered => "agent_registered",
            EventType::AgentHeartbeat => "agent_heartbeat",
            EventType::AgentMessage => "agent_message",
            EventType::AgentQuestion => "agent_question",
            EventType::AgentResponse => "agent_response",
        };
        write!(f, "{}", s)
    }
}

/// A published event. `event_id` is allocated by the bus inside the same
/// write transaction that stores the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: u64,
    pub timestamp_ms: u64,
    pub agent_id: AgentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_role: Option<Role>,
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

/// An event as submitted to the bus, before id and timestamp assignment.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub agent_id: AgentId,
    pub agent_role: Option<Role>,
    pub task_id: Option<TaskId>,
    pub file_path: Option<PathBuf>,
    pub data: BTreeMap<String, String>,
}

impl EventDraft {
    pub fn from_agent(agent_id: impl Into<AgentId>) -> Self {
        Self {
            agent_id: agent_id.into(),
            ..Self::default()
        }
    }

    pub fn role(mut self, role: Role) -> Self {
        self.agent_role = Some(role);
        self
    }

    pub fn task(mut self, task_id: impl Into<TaskId>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn datum(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Filter for polling queries against the log.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Return events with id strictly greater than this watermark.
    pub since_id: u64,
    /// When non-empty, only these types match.
    pub event_types: Vec<EventType>,
    pub agent_id: Option<AgentId>,
    pub task_id: Option<TaskId>,
    pub limit: Option<usize>,
}

impl EventFilter {
    pub fn since(since_id: u64) -> Self {
        Self {
            since_id,
            ..Self::default()
        }
    }

    pub fn types(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.event_types = types.into_iter().collect();
        self
    }

    pub fn agent(mut self, agent_id: impl Into<AgentId>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn task(mut self, task_id: impl Into<TaskId>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a stored event passes this filter (watermark aside).
    pub fn matches(&self, event: &Event) -> bool {
        if !self.event_types.is_empty() && !self.event_types.contains(&event.event_type) {
            return false;
        }
        if let Some(agent_id) = &self.agent_id {
            if &event.agent_id != agent_id {
                return false;
            }
        }
        if let Some(task_id) = &self.task_id {
            if event.task_id.as_ref() != Some(task_id) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
