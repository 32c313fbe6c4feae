// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session grouping and token usage roll-up.
//!
//! Exactly one session is current per process. The current pointer is a
//! per-process cache: on restart it is rebuilt from the most recently
//! active session in the store.

use crate::bucket::buckets;
use crate::store::Store;
use chrono::DateTime;
use parking_lot::Mutex;
use smith_core::{
    session_id_for_day, Clock, CoreError, LlmUsage, Session, SessionId, SessionStatus,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionStore {
    store: Store,
    clock: Arc<dyn Clock>,
    current: Arc<Mutex<Option<SessionId>>>,
}

impl SessionStore {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// The current session id, creating a session if none exists.
    ///
    /// Restart recovery: with no in-process pointer, the most recently
    /// active non-archived session becomes current.
    pub fn get_or_create(&self) -> Result<SessionId, CoreError> {
        if let Some(id) = self.current.lock().clone() {
            return Ok(id);
        }
        let now_ms = self.clock.epoch_ms();
        let id = self.store.update(|txn| {
            let mut active: Vec<Session> = Vec::new();
            for (_, value) in txn.iter(buckets::SESSIONS)? {
                let session: Session = serde_json::from_slice(&value)
                    .map_err(|e| CoreError::Internal(format!("decode session: {}", e)))?;
                if session.status == SessionStatus::Active {
                    active.push(session);
                }
            }
            if let Some(session) = active.into_iter().max_by_key(|s| s.last_active_ms) {
                return Ok(session.id);
            }
            let session = new_session(txn, now_ms)?;
            Ok(session.id)
        })?;
        *self.current.lock() = Some(id.clone());
        Ok(id)
    }

    /// Archive the current session (if any) and start a fresh one.
    pub fn create_new(&self) -> Result<SessionId, CoreError> {
        let now_ms = self.clock.epoch_ms();
        let previous = self.current.lock().clone();
        let id = self.store.update(|txn| {
            if let Some(prev_id) = previous {
                if let Some(mut prev) =
                    txn.get_json::<Session>(buckets::SESSIONS, prev_id.as_str().as_bytes())?
                {
                    prev.status = SessionStatus::Archived;
                    txn.put_json(buckets::SESSIONS, prev_id.as_str().as_bytes(), &prev)?;
                }
            }
            let session = new_session(txn, now_ms)?;
            Ok(session.id)
        })?;
        *self.current.lock() = Some(id.clone());
        tracing::info!(session = %id, "new session");
        Ok(id)
    }

    /// Make `session_id` current and refresh its activity stamp.
    pub fn switch(&self, session_id: &SessionId) -> Result<(), CoreError> {
        let now_ms = self.clock.epoch_ms();
        self.store.update(|txn| {
            let mut session: Session = txn
                .get_json(buckets::SESSIONS, session_id.as_str().as_bytes())?
                .ok_or_else(|| CoreError::NotFound(format!("session {}", session_id)))?;
            session.last_active_ms = now_ms;
            txn.put_json(buckets::SESSIONS, session_id.as_str().as_bytes(), &session)
        })?;
        *self.current.lock() = Some(session_id.clone());
        Ok(())
    }

    /// Sessions most-recently-active first.
    pub fn list(&self, limit: usize) -> Result<Vec<Session>, CoreError> {
        self.store.view(|txn| {
            let mut sessions: Vec<Session> = txn
                .iter(buckets::SESSIONS)?
                .into_iter()
                .map(|(_, value)| {
                    serde_json::from_slice(&value)
                        .map_err(|e| CoreError::Internal(format!("decode session: {}", e)))
                })
                .collect::<Result<_, _>>()?;
            sessions.sort_by(|a, b| b.last_active_ms.cmp(&a.last_active_ms));
            sessions.truncate(limit);
            Ok(sessions)
        })
    }

    pub fn get(&self, session_id: &SessionId) -> Result<Session, CoreError> {
        self.store.view(|txn| {
            txn.get_json(buckets::SESSIONS, session_id.as_str().as_bytes())?
                .ok_or_else(|| CoreError::NotFound(format!("session {}", session_id)))
        })
    }

    /// Atomically add one provider call's token counts to the session
    /// roll-up.
    pub fn add_usage(
        &self,
        session_id: &SessionId,
        prompt_tokens: u64,
        completion_tokens: u64,
    ) -> Result<LlmUsage, CoreError> {
        self.store.update(|txn| {
            let mut usage: LlmUsage = txn
                .get_json(buckets::USAGE, session_id.as_str().as_bytes())?
                .unwrap_or_else(|| LlmUsage::new(session_id.clone()));
            usage.add(prompt_tokens, completion_tokens);
            txn.put_json(buckets::USAGE, session_id.as_str().as_bytes(), &usage)?;
            Ok(usage)
        })
    }

    /// Token roll-up for a session (zeroes when never used).
    pub fn usage(&self, session_id: &SessionId) -> Result<LlmUsage, CoreError> {
        self.store.view(|txn| {
            Ok(txn
                .get_json(buckets::USAGE, session_id.as_str().as_bytes())?
                .unwrap_or_else(|| LlmUsage::new(session_id.clone())))
        })
    }
}

/// Allocate the next `session-YYYY-MM-DD-nnn` id for today and store the
/// fresh active session.
fn new_session(txn: &crate::bucket::Txn<'_>, now_ms: u64) -> Result<Session, CoreError> {
    let day = DateTime::from_timestamp_millis(now_ms as i64)
        .ok_or_else(|| CoreError::Internal(format!("timestamp out of range: {}", now_ms)))?
        .date_naive();
    let prefix = format!("session-{}-", day.format("%Y-%m-%d"));
    let today = txn
        .iter(buckets::SESSIONS)?
        .into_iter()
        .filter(|(key, _)| key.starts_with(prefix.as_bytes()))
        .count() as u32;
    let id = session_id_for_day(day, today + 1);
    let session = Session::new(id.clone(), now_ms);
    txn.put_json(buckets::SESSIONS, id.as_str().as_bytes(), &session)?;
    Ok(session)
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
