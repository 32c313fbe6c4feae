// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent presence record.
//!
//! Agents register at process start and heartbeat every second. A record
//! whose heartbeat is older than [`T_DEAD_MS`] is reported as dead on
//! read; its locks are NOT reclaimed automatically — crashed agents
//! require human intervention.

use crate::id::{AgentId, TaskId};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected heartbeat interval.
pub const T_HEARTBEAT_MS: u64 = 1_000;

/// Staleness threshold: three missed heartbeats.
pub const T_DEAD_MS: u64 = 3 * T_HEARTBEAT_MS;

/// Presence status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Working a task (`task_id` is set).
    Active,
    Idle,
    Dead,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Active => write!(f, "active"),
            AgentStatus::Idle => write!(f, "idle"),
            AgentStatus::Dead => write!(f, "dead"),
        }
    }
}

/// Registry entry for a worker agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub agent_id: AgentId,
    pub role: Role,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub pid: u32,
    pub started_at_ms: u64,
    pub last_heartbeat_ms: u64,
}

impl AgentRecord {
    pub fn new(agent_id: AgentId, role: Role, pid: u32, now_ms: u64) -> Self {
        Self {
            agent_id,
            role,
            status: AgentStatus::Idle,
            task_id: None,
            pid,
            started_at_ms: now_ms,
            last_heartbeat_ms: now_ms,
        }
    }

    /// Whether the heartbeat is older than the staleness threshold.
    pub fn is_stale(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_heartbeat_ms) > T_DEAD_MS
    }

    /// Status as observed at `now_ms`: stale records read as dead.
    pub fn observed_status(&self, now_ms: u64) -> AgentStatus {
        if self.status != AgentStatus::Dead && self.is_stale(now_ms) {
            AgentStatus::Dead
        } else {
            self.status
        }
    }
}

#[cfg(test)]
#[path = "agent_record_tests.rs"]
mod tests;
