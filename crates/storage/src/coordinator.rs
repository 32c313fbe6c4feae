// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator facade.
//!
//! Composes the store-backed components behind one handle. Every state
//! change made by agents, tools, or the chat session flows through here;
//! the UI reads its aggregate views.

use crate::events::EventBus;
use crate::locks::LockManager;
use crate::registry::Registry;
use crate::sessions::SessionStore;
use crate::store::Store;
use crate::tasks::TaskStore;
use smith_core::{
    AgentId, AgentRecord, Clock, CoreError, Event, EventFilter, Role, SessionId, Task, TaskSpec,
    TaskStatus,
};
use std::path::Path;
use std::sync::Arc;

/// Task counts by status, for the UI sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub backlog: usize,
    pub wip: usize,
    pub review: usize,
    pub done: usize,
    pub failed: usize,
}

impl TaskStats {
    pub fn total(&self) -> usize {
        self.backlog + self.wip + self.review + self.done + self.failed
    }
}

/// Facade over the coordination store.
#[derive(Clone)]
pub struct Coordinator {
    pub events: EventBus,
    pub locks: LockManager,
    pub registry: Registry,
    pub tasks: TaskStore,
    pub sessions: SessionStore,
}

impl Coordinator {
    /// Open the store at `<project>/.smith/smith.db` and wire the
    /// components.
    pub fn open(db_path: &Path, clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        Ok(Self::with_store(Store::open(db_path)?, clock))
    }

    /// In-memory coordinator for tests.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        Ok(Self::with_store(Store::in_memory()?, clock))
    }

    fn with_store(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            events: EventBus::new(store.clone(), clock.clone()),
            locks: LockManager::new(store.clone(), clock.clone()),
            registry: Registry::new(store.clone(), clock.clone()),
            tasks: TaskStore::new(store.clone(), clock.clone()),
            sessions: SessionStore::new(store, clock),
        }
    }

    /// Create a task in the current session.
    pub fn create_task(&self, spec: TaskSpec, created_by: &AgentId) -> Result<Task, CoreError> {
        let session_id = self.sessions.get_or_create()?;
        self.tasks.create(spec, &session_id, created_by)
    }

    /// The current session id, creating one lazily.
    pub fn current_session(&self) -> Result<SessionId, CoreError> {
        self.sessions.get_or_create()
    }

    /// Task counts by status.
    pub fn task_stats(&self) -> Result<TaskStats, CoreError> {
        let mut stats = TaskStats::default();
        for task in self.tasks.list(None)? {
            match task.status {
                TaskStatus::Backlog => stats.backlog += 1,
                TaskStatus::Wip => stats.wip += 1,
                TaskStatus::Review => stats.review += 1,
                TaskStatus::Done => stats.done += 1,
                TaskStatus::Failed => stats.failed += 1,
            }
        }
        Ok(stats)
    }

    /// Agents not observed dead, any role.
    pub fn active_agents(&self) -> Result<Vec<AgentRecord>, CoreError> {
        self.registry.list_active(None)
    }

    /// Events after `since_id`, unfiltered.
    pub fn recent_events(&self, since_id: u64) -> Result<Vec<Event>, CoreError> {
        self.events.query(&EventFilter::since(since_id))
    }

    /// Most recent failures, newest last, for the UI sidebar.
    pub fn recent_failures(&self, since_id: u64, limit: usize) -> Result<Vec<Event>, CoreError> {
        self.events.query(
            &EventFilter::since(since_id)
                .types([smith_core::EventType::TaskFailed])
                .limit(limit),
        )
    }

    /// Backlog tasks claimable by an agent of `role`, best first.
    pub fn available_tasks(&self, role: Role) -> Result<Vec<Task>, CoreError> {
        self.tasks.available(Some(role))
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
