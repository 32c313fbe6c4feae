// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent presence registry.
//!
//! Agents register at startup, heartbeat every second, and unregister on
//! shutdown. Readers treat a stale heartbeat as dead; the records of
//! crashed agents are cleaned up lazily on the next register of the same
//! id, never garbage-collected.

use crate::bucket::buckets;
use crate::store::Store;
use smith_core::{
    AgentId, AgentRecord, AgentStatus, Clock, CoreError, EventDraft, EventType, Role, TaskId,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct Registry {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl Registry {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Register an agent. Idempotent: re-registering refreshes the record
    /// and resets it to idle.
    pub fn register(&self, agent_id: &AgentId, role: Role, pid: u32) -> Result<(), CoreError> {
        let now_ms = self.clock.epoch_ms();
        self.store.update(|txn| {
            let record = AgentRecord::new(agent_id.clone(), role, pid, now_ms);
            txn.put_json(buckets::AGENTS, agent_id.as_str().as_bytes(), &record)?;
            txn.append_event(
                EventType::AgentRegistered,
                EventDraft::from_agent(agent_id.clone())
                    .role(role)
                    .datum("pid", pid.to_string()),
                now_ms,
            )?;
            Ok(())
        })?;
        tracing::info!(agent = %agent_id, %role, pid, "agent registered");
        Ok(())
    }

    /// Refresh the heartbeat timestamp.
    pub fn heartbeat(&self, agent_id: &AgentId) -> Result<(), CoreError> {
        let now_ms = self.clock.epoch_ms();
        self.store.update(|txn| {
            let mut record = self::require(txn, agent_id)?;
            record.last_heartbeat_ms = now_ms;
            txn.put_json(buckets::AGENTS, agent_id.as_str().as_bytes(), &record)
        })
    }

    /// Assign or clear the agent's current task, transitioning
    /// active ↔ idle.
    pub fn set_task(&self, agent_id: &AgentId, task_id: Option<TaskId>) -> Result<(), CoreError> {
        self.store.update(|txn| {
            let mut record = self::require(txn, agent_id)?;
            record.status = if task_id.is_some() {
                AgentStatus::Active
            } else {
                AgentStatus::Idle
            };
            record.task_id = task_id;
            txn.put_json(buckets::AGENTS, agent_id.as_str().as_bytes(), &record)
        })
    }

    /// Mark the agent dead. The record is kept for the UI.
    pub fn unregister(&self, agent_id: &AgentId) -> Result<(), CoreError> {
        self.store.update(|txn| {
            let mut record = self::require(txn, agent_id)?;
            record.status = AgentStatus::Dead;
            record.task_id = None;
            txn.put_json(buckets::AGENTS, agent_id.as_str().as_bytes(), &record)
        })?;
        tracing::info!(agent = %agent_id, "agent unregistered");
        Ok(())
    }

    /// Agents not observed dead, optionally filtered by role. Stale
    /// heartbeats read as dead and are excluded.
    pub fn list_active(&self, role: Option<Role>) -> Result<Vec<AgentRecord>, CoreError> {
        let now_ms = self.clock.epoch_ms();
        self.store.view(|txn| {
            let mut records = Vec::new();
            for (_, value) in txn.iter(buckets::AGENTS)? {
                let record: AgentRecord = serde_json::from_slice(&value)
                    .map_err(|e| CoreError::Internal(format!("decode agent: {}", e)))?;
                if record.observed_status(now_ms) == AgentStatus::Dead {
                    continue;
                }
                if role.is_some_and(|r| r != record.role) {
                    continue;
                }
                records.push(record);
            }
            Ok(records)
        })
    }

    /// The raw record for one agent.
    pub fn get(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, CoreError> {
        self.store
            .view(|txn| txn.get_json(buckets::AGENTS, agent_id.as_str().as_bytes()))
    }
}

fn require(txn: &crate::bucket::Txn<'_>, agent_id: &AgentId) -> Result<AgentRecord, CoreError> {
    txn.get_json(buckets::AGENTS, agent_id.as_str().as_bytes())?
        .ok_or_else(|| CoreError::NotFound(format!("agent {}", agent_id)))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
