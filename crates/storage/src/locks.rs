// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive per-file locks.
//!
//! No waiting and no deadlock: `acquire` either inserts the lock or
//! fails with `LockHeld` carrying the current owner, and the caller
//! retries or abandons. `release_all` sweeps an agent's locks in one
//! transaction and runs on task completion, failure, and shutdown.

use crate::bucket::buckets;
use crate::store::Store;
use smith_core::{AgentId, Clock, CoreError, EventDraft, EventType, FileLock, TaskId};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn path_key(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

/// Lock table operations.
#[derive(Clone)]
pub struct LockManager {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl LockManager {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Acquire the lock on `path` for (agent, task). Fails fast with
    /// `LockHeld` when another owner holds it; re-acquiring a lock the
    /// agent already holds is a no-op.
    pub fn acquire(
        &self,
        path: &Path,
        agent_id: &AgentId,
        task_id: &TaskId,
    ) -> Result<FileLock, CoreError> {
        let now_ms = self.clock.epoch_ms();
        let key = path_key(path);
        let lock = self.store.update(|txn| {
            if let Some(existing) = txn.get_json::<FileLock>(buckets::LOCKS, &key)? {
                if existing.agent_id == *agent_id {
                    return Ok(existing);
                }
                return Err(CoreError::LockHeld {
                    path: existing.file_path.clone(),
                    agent_id: existing.agent_id,
                    task_id: existing.task_id,
                });
            }
            let lock = FileLock {
                file_path: path.to_path_buf(),
                agent_id: agent_id.clone(),
                task_id: task_id.clone(),
                locked_at_ms: now_ms,
            };
            txn.put_json(buckets::LOCKS, &key, &lock)?;
            txn.append_event(
                EventType::FileLocked,
                EventDraft::from_agent(agent_id.clone())
                    .task(task_id.clone())
                    .file(path),
                now_ms,
            )?;
            Ok(lock)
        })?;
        tracing::debug!(path = %path.display(), agent = %agent_id, "file locked");
        Ok(lock)
    }

    /// Release the lock on `path`. Releasing a lock held by another agent
    /// is an error; releasing an unheld path is `NotFound`.
    pub fn release(&self, path: &Path, agent_id: &AgentId) -> Result<(), CoreError> {
        let now_ms = self.clock.epoch_ms();
        let key = path_key(path);
        self.store.update(|txn| {
            let existing: FileLock = txn
                .get_json(buckets::LOCKS, &key)?
                .ok_or_else(|| CoreError::NotFound(format!("lock on {}", path.display())))?;
            if existing.agent_id != *agent_id {
                return Err(CoreError::InvalidState(format!(
                    "lock on {} is owned by {}, not {}",
                    path.display(),
                    existing.agent_id,
                    agent_id
                )));
            }
            txn.delete(buckets::LOCKS, &key)?;
            txn.append_event(
                EventType::FileUnlocked,
                EventDraft::from_agent(agent_id.clone())
                    .task(existing.task_id.clone())
                    .file(path),
                now_ms,
            )?;
            Ok(())
        })?;
        tracing::debug!(path = %path.display(), agent = %agent_id, "file unlocked");
        Ok(())
    }

    /// Atomically release every lock owned by `agent_id`. Returns the
    /// paths released.
    pub fn release_all(&self, agent_id: &AgentId) -> Result<Vec<PathBuf>, CoreError> {
        let now_ms = self.clock.epoch_ms();
        let released = self.store.update(|txn| {
            let mut released = Vec::new();
            for (key, value) in txn.iter(buckets::LOCKS)? {
                let lock: FileLock = serde_json::from_slice(&value)
                    .map_err(|e| CoreError::Internal(format!("decode lock: {}", e)))?;
                if lock.agent_id == *agent_id {
                    txn.delete(buckets::LOCKS, &key)?;
                    txn.append_event(
                        EventType::FileUnlocked,
                        EventDraft::from_agent(agent_id.clone())
                            .task(lock.task_id.clone())
                            .file(lock.file_path.clone()),
                        now_ms,
                    )?;
                    released.push(lock.file_path);
                }
            }
            Ok(released)
        })?;
        if !released.is_empty() {
            tracing::debug!(agent = %agent_id, count = released.len(), "released all locks");
        }
        Ok(released)
    }

    /// Snapshot of all held locks, in path order.
    pub fn list(&self) -> Result<Vec<FileLock>, CoreError> {
        self.store.view(|txn| {
            txn.iter(buckets::LOCKS)?
                .into_iter()
                .map(|(_, value)| {
                    serde_json::from_slice(&value)
                        .map_err(|e| CoreError::Internal(format!("decode lock: {}", e)))
                })
                .collect()
        })
    }

    /// Current owner of `path`, if locked.
    pub fn owner(&self, path: &Path) -> Result<Option<FileLock>, CoreError> {
        self.store
            .view(|txn| txn.get_json(buckets::LOCKS, &path_key(path)))
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
