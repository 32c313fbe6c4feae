// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task queue operations and the task state machine.
//!
//! Every operation is one write transaction and publishes its event in
//! the same transaction, so `task_created`/`task_claimed`/... can never
//! be observed without the state change (or vice versa).

use crate::bucket::{buckets, meta, Txn};
use crate::store::Store;
use smith_core::{
    next_task_id, AgentId, Clock, CoreError, EventDraft, EventType, Role, Session, Task, TaskId,
    TaskMemory, TaskSpec, TaskStatus,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct TaskStore {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl TaskStore {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a backlog task in `session_id`, assigning the next stable
    /// id. Dependencies must name existing tasks (ids are assigned in
    /// creation order, so the dependency graph cannot form a cycle).
    /// Bumps the session's task count and, for its first task, sets the
    /// session title.
    pub fn create(
        &self,
        spec: TaskSpec,
        session_id: &smith_core::SessionId,
        created_by: &AgentId,
    ) -> Result<Task, CoreError> {
        let now_ms = self.clock.epoch_ms();
        let task = self.store.update(|txn| {
            for dep in &spec.depends_on {
                if txn.get(buckets::TASKS, dep.as_str().as_bytes())?.is_none() {
                    return Err(CoreError::NotFound(format!("dependency {}", dep)));
                }
            }

            let count = txn.meta_u64(meta::TASK_COUNT)? + 1;
            txn.set_meta_u64(meta::TASK_COUNT, count)?;
            let id = next_task_id(count);
            let task = Task::new(id.clone(), spec, session_id.clone(), now_ms);

            let mut session: Session = txn
                .get_json(buckets::SESSIONS, session_id.as_str().as_bytes())?
                .ok_or_else(|| CoreError::NotFound(format!("session {}", session_id)))?;
            session.task_count += 1;
            session.last_active_ms = now_ms;
            if session.title.is_empty() {
                session.title = task.title.clone();
            }
            txn.put_json(buckets::SESSIONS, session_id.as_str().as_bytes(), &session)?;

            txn.put_json(buckets::TASKS, id.as_str().as_bytes(), &task)?;
            txn.append_event(
                EventType::TaskCreated,
                EventDraft::from_agent(created_by.clone())
                    .role(task.role)
                    .task(id.clone())
                    .datum("title", task.title.clone())
                    .datum("priority", task.priority.to_string()),
                now_ms,
            )?;
            Ok(task)
        })?;
        tracing::info!(task = %task.id, role = %task.role, "task created");
        Ok(task)
    }

    /// Claim a backlog task for `agent_id`. Exactly one concurrent
    /// claimer wins; losers get `InvalidState`.
    pub fn claim(&self, task_id: &TaskId, agent_id: &AgentId) -> Result<Task, CoreError> {
        let now_ms = self.clock.epoch_ms();
        let task = self.store.update(|txn| {
            let mut task = require(txn, task_id)?;
            if task.status != TaskStatus::Backlog {
                return Err(CoreError::InvalidState(format!(
                    "task {} is {}, not backlog",
                    task_id, task.status
                )));
            }
            task.status = TaskStatus::Wip;
            task.agent_id = agent_id.clone();
            task.updated_at_ms = now_ms;
            txn.put_json(buckets::TASKS, task_id.as_str().as_bytes(), &task)?;
            txn.append_event(
                EventType::TaskClaimed,
                EventDraft::from_agent(agent_id.clone())
                    .role(task.role)
                    .task(task_id.clone()),
                now_ms,
            )?;
            Ok(task)
        })?;
        tracing::info!(task = %task_id, agent = %agent_id, "task claimed");
        Ok(task)
    }

    /// Move a task to `status`, validating the transition. `done` is
    /// not reachable here: it requires the completion stamp and result
    /// that only [`complete`](Self::complete) records.
    pub fn update_status(&self, task_id: &TaskId, status: TaskStatus) -> Result<Task, CoreError> {
        let now_ms = self.clock.epoch_ms();
        self.store.update(|txn| {
            let mut task = require(txn, task_id)?;
            if status == TaskStatus::Done {
                return Err(CoreError::InvalidState(format!(
                    "task {}: use complete() to finish a task",
                    task_id
                )));
            }
            if !task.status.can_transition(status) {
                return Err(CoreError::InvalidState(format!(
                    "task {}: illegal transition {} -> {}",
                    task_id, task.status, status
                )));
            }
            let agent_id = task.agent_id.clone();
            if matches!(status, TaskStatus::Backlog) {
                task.agent_id = AgentId::default();
            }
            task.status = status;
            task.updated_at_ms = now_ms;
            txn.put_json(buckets::TASKS, task_id.as_str().as_bytes(), &task)?;
            txn.append_event(
                EventType::TaskUpdated,
                EventDraft::from_agent(agent_id)
                    .role(task.role)
                    .task(task_id.clone())
                    .datum("status", status.to_string()),
                now_ms,
            )?;
            Ok(task)
        })
    }

    /// Complete a wip/review task: status=done, result recorded, memory
    /// merged, `completed_at` stamped.
    pub fn complete(
        &self,
        task_id: &TaskId,
        result: impl Into<String>,
        memory: Option<TaskMemory>,
    ) -> Result<Task, CoreError> {
        let now_ms = self.clock.epoch_ms();
        let result = result.into();
        let task = self.store.update(|txn| {
            let mut task = require(txn, task_id)?;
            if !task.status.can_transition(TaskStatus::Done) {
                return Err(CoreError::InvalidState(format!(
                    "task {}: cannot complete from {}",
                    task_id, task.status
                )));
            }
            task.status = TaskStatus::Done;
            task.result = result;
            task.completed_at_ms = Some(now_ms);
            task.updated_at_ms = now_ms;
            if let Some(memory) = memory {
                task.memory.merge(memory);
            }
            txn.put_json(buckets::TASKS, task_id.as_str().as_bytes(), &task)?;
            txn.append_event(
                EventType::TaskCompleted,
                EventDraft::from_agent(task.agent_id.clone())
                    .role(task.role)
                    .task(task_id.clone()),
                now_ms,
            )?;
            Ok(task)
        })?;
        tracing::info!(task = %task_id, "task completed");
        Ok(task)
    }

    /// Fail a task: back to backlog with the agent cleared, error and
    /// memory retained so the next agent starts with context.
    pub fn fail(
        &self,
        task_id: &TaskId,
        error: impl Into<String>,
        memory: Option<TaskMemory>,
    ) -> Result<Task, CoreError> {
        let now_ms = self.clock.epoch_ms();
        let error = error.into();
        let task = self.store.update(|txn| {
            let mut task = require(txn, task_id)?;
            if task.status != TaskStatus::Wip {
                return Err(CoreError::InvalidState(format!(
                    "task {}: cannot fail from {}",
                    task_id, task.status
                )));
            }
            let agent_id = task.agent_id.clone();
            task.status = TaskStatus::Backlog;
            task.agent_id = AgentId::default();
            task.error = error.clone();
            task.updated_at_ms = now_ms;
            if let Some(memory) = memory {
                task.memory.merge(memory);
            }
            txn.put_json(buckets::TASKS, task_id.as_str().as_bytes(), &task)?;
            txn.append_event(
                EventType::TaskFailed,
                EventDraft::from_agent(agent_id)
                    .role(task.role)
                    .task(task_id.clone())
                    .datum("error", error.clone()),
                now_ms,
            )?;
            Ok(task)
        })?;
        tracing::warn!(task = %task_id, error = %task.error, "task failed");
        Ok(task)
    }

    pub fn get(&self, task_id: &TaskId) -> Result<Task, CoreError> {
        self.store.view(|txn| require(txn, task_id))
    }

    /// All tasks, optionally filtered by status, in id order.
    pub fn list(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, CoreError> {
        self.store.view(|txn| {
            let mut tasks = all_tasks(txn)?;
            if let Some(status) = status {
                tasks.retain(|t| t.status == status);
            }
            Ok(tasks)
        })
    }

    /// Backlog tasks whose every dependency is done, sorted by priority
    /// descending then age ascending. Recomputed from scratch on each
    /// call.
    pub fn available(&self, role: Option<Role>) -> Result<Vec<Task>, CoreError> {
        self.store.view(|txn| {
            let tasks = all_tasks(txn)?;
            let done: std::collections::BTreeSet<&TaskId> = tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Done)
                .map(|t| &t.id)
                .collect();
            let mut available: Vec<Task> = tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Backlog)
                .filter(|t| role.map_or(true, |r| t.role == r))
                .filter(|t| t.depends_on.iter().all(|dep| done.contains(dep)))
                .cloned()
                .collect();
            available.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then(a.created_at_ms.cmp(&b.created_at_ms))
                    .then(a.id.as_str().cmp(b.id.as_str()))
            });
            Ok(available)
        })
    }

    /// Most recently updated tasks, optionally by role. Used by agents
    /// as a memory query before tackling new work.
    pub fn recent(&self, role: Option<Role>, limit: usize) -> Result<Vec<Task>, CoreError> {
        self.store.view(|txn| {
            let mut tasks = all_tasks(txn)?;
            if let Some(role) = role {
                tasks.retain(|t| t.role == role);
            }
            tasks.sort_by(|a, b| b.updated_at_ms.cmp(&a.updated_at_ms));
            tasks.truncate(limit);
            Ok(tasks)
        })
    }
}

fn require(txn: &Txn<'_>, task_id: &TaskId) -> Result<Task, CoreError> {
    txn.get_json(buckets::TASKS, task_id.as_str().as_bytes())?
        .ok_or_else(|| CoreError::NotFound(format!("task {}", task_id)))
}

fn all_tasks(txn: &Txn<'_>) -> Result<Vec<Task>, CoreError> {
    txn.iter(buckets::TASKS)?
        .into_iter()
        .map(|(_, value)| {
            serde_json::from_slice(&value)
                .map_err(|e| CoreError::Internal(format!("decode task: {}", e)))
        })
        .collect()
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
