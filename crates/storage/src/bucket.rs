// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bucket operations available inside a store transaction.
//!
//! Records are serialized as self-describing JSON blobs so schema
//! evolution stays additive. Event keys are big-endian u64 so ordered
//! iteration is chronological.

use rusqlite::{params, OptionalExtension, Transaction};
use serde::de::DeserializeOwned;
use serde::Serialize;
use smith_core::{CoreError, Event, EventDraft, EventType};

/// Bucket names. One bucket per record type plus a meta bucket for
/// counters.
pub mod buckets {
    pub const TASKS: &str = "tasks";
    pub const SESSIONS: &str = "sessions";
    pub const LOCKS: &str = "locks";
    pub const AGENTS: &str = "agents";
    pub const EVENTS: &str = "events";
    pub const USAGE: &str = "usage";
    pub const META: &str = "meta";
}

/// Meta bucket keys.
pub mod meta {
    pub const LAST_EVENT_ID: &str = "last_event_id";
    pub const TASK_COUNT: &str = "task_count";
}

fn internal(context: &str, err: impl std::fmt::Display) -> CoreError {
    CoreError::Internal(format!("{}: {}", context, err))
}

/// Transaction handle passed to `update`/`view` closures.
pub struct Txn<'a> {
    tx: &'a Transaction<'a>,
}

impl<'a> Txn<'a> {
    pub(crate) fn new(tx: &'a Transaction<'a>) -> Self {
        Self { tx }
    }

    pub fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>, CoreError> {
        self.tx
            .query_row(
                "SELECT value FROM kv WHERE bucket = ?1 AND key = ?2",
                params![bucket, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| internal("get", e))
    }

    pub fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<(), CoreError> {
        self.tx
            .execute(
                "INSERT INTO kv (bucket, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (bucket, key) DO UPDATE SET value = excluded.value",
                params![bucket, key, value],
            )
            .map(|_| ())
            .map_err(|e| internal("put", e))
    }

    /// Delete a key. Returns whether it existed.
    pub fn delete(&self, bucket: &str, key: &[u8]) -> Result<bool, CoreError> {
        self.tx
            .execute(
                "DELETE FROM kv WHERE bucket = ?1 AND key = ?2",
                params![bucket, key],
            )
            .map(|n| n > 0)
            .map_err(|e| internal("delete", e))
    }

    /// All entries of a bucket in key order.
    pub fn iter(&self, bucket: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>, CoreError> {
        let mut stmt = self
            .tx
            .prepare("SELECT key, value FROM kv WHERE bucket = ?1 ORDER BY key")
            .map_err(|e| internal("iter prepare", e))?;
        let rows = stmt
            .query_map(params![bucket], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| internal("iter query", e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| internal("iter row", e))
    }

    /// Entries with key strictly greater than `after`, in key order.
    pub fn iter_after(
        &self,
        bucket: &str,
        after: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, CoreError> {
        let mut stmt = self
            .tx
            .prepare("SELECT key, value FROM kv WHERE bucket = ?1 AND key > ?2 ORDER BY key")
            .map_err(|e| internal("iter_after prepare", e))?;
        let rows = stmt
            .query_map(params![bucket, after], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| internal("iter_after query", e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| internal("iter_after row", e))
    }

    pub fn count(&self, bucket: &str) -> Result<u64, CoreError> {
        self.tx
            .query_row(
                "SELECT COUNT(*) FROM kv WHERE bucket = ?1",
                params![bucket],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as u64)
            .map_err(|e| internal("count", e))
    }

    // ── typed helpers ───────────────────────────────────────────────────

    pub fn get_json<T: DeserializeOwned>(
        &self,
        bucket: &str,
        key: &[u8],
    ) -> Result<Option<T>, CoreError> {
        match self.get(bucket, key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| internal("decode record", e)),
            None => Ok(None),
        }
    }

    pub fn put_json<T: Serialize>(
        &self,
        bucket: &str,
        key: &[u8],
        value: &T,
    ) -> Result<(), CoreError> {
        let bytes = serde_json::to_vec(value).map_err(|e| internal("encode record", e))?;
        self.put(bucket, key, &bytes)
    }

    /// Read a u64 counter from the meta bucket, defaulting to zero.
    pub fn meta_u64(&self, key: &str) -> Result<u64, CoreError> {
        Ok(self
            .get_json::<u64>(buckets::META, key.as_bytes())?
            .unwrap_or(0))
    }

    pub fn set_meta_u64(&self, key: &str, value: u64) -> Result<(), CoreError> {
        self.put_json(buckets::META, key.as_bytes(), &value)
    }

    // ── event log ───────────────────────────────────────────────────────

    /// Append an event within this transaction: allocate the next dense
    /// id, store under its big-endian key, bump the last-id meta.
    ///
    /// Mutating operations call this so their state change and its event
    /// commit atomically.
    pub fn append_event(
        &self,
        event_type: EventType,
        draft: EventDraft,
        now_ms: u64,
    ) -> Result<Event, CoreError> {
        let event_id = self.meta_u64(meta::LAST_EVENT_ID)? + 1;
        let event = Event {
            event_id,
            timestamp_ms: now_ms,
            agent_id: draft.agent_id,
            agent_role: draft.agent_role,
            event_type,
            task_id: draft.task_id,
            file_path: draft.file_path,
            data: draft.data,
        };
        self.put_json(buckets::EVENTS, &event_id.to_be_bytes(), &event)?;
        self.set_meta_u64(meta::LAST_EVENT_ID, event_id)?;
        Ok(event)
    }
}

#[cfg(test)]
#[path = "bucket_tests.rs"]
mod tests;
