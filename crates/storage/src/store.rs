// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded single-file key-value store.
//!
//! One SQLite file in WAL mode holds every bucket. Writes go through a
//! single connection behind a mutex: `update` runs its closure inside
//! an immediate (exclusive-write) transaction and commits on `Ok`,
//! rolls back on `Err`. Reads do not touch that connection: `view`
//! takes a connection from a reader pool (opening a new one against
//! the same database when the pool is empty), so read snapshots run
//! concurrently with each other and with the writer. Buckets are
//! created lazily on first write and iterate in key order.

use crate::bucket::Txn;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use smith_core::CoreError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Distinguishes in-memory store instances so their reader connections
/// attach to the right shared cache.
static MEMORY_STORE_SEQ: AtomicU64 = AtomicU64::new(0);

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

enum Backing {
    File(PathBuf),
    /// Shared-cache URI; the writer connection keeps the database
    /// alive.
    Memory(String),
}

/// Handle to the store file. Cheap to clone; all clones share the
/// writer connection and the reader pool.
#[derive(Clone)]
pub struct Store {
    writer: Arc<Mutex<Connection>>,
    readers: Arc<Mutex<Vec<Connection>>>,
    backing: Arc<Backing>,
}

impl Store {
    /// Open (or create) the store file at `path`.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Internal(format!("create store dir: {}", e)))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| CoreError::Internal(format!("open store {}: {}", path.display(), e)))?;
        Self::init(conn, Backing::File(path.to_path_buf()))
    }

    /// In-memory store for tests. Backed by a shared-cache database so
    /// reader connections see the writer's data.
    pub fn in_memory() -> Result<Self, CoreError> {
        let seq = MEMORY_STORE_SEQ.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:smith-mem-{}?mode=memory&cache=shared", seq);
        let conn = Connection::open(&uri)
            .map_err(|e| CoreError::Internal(format!("open in-memory store: {}", e)))?;
        Self::init(conn, Backing::Memory(uri))
    }

    fn init(conn: Connection, backing: Backing) -> Result<Self, CoreError> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            CREATE TABLE IF NOT EXISTS kv (
                bucket TEXT NOT NULL,
                key    BLOB NOT NULL,
                value  BLOB NOT NULL,
                PRIMARY KEY (bucket, key)
            ) WITHOUT ROWID;
            "#,
        )
        .map_err(|e| CoreError::Internal(format!("init store schema: {}", e)))?;
        Ok(Self {
            writer: Arc::new(Mutex::new(conn)),
            readers: Arc::new(Mutex::new(Vec::new())),
            backing: Arc::new(backing),
        })
    }

    /// Run `f` under an exclusive write transaction. Durable on `Ok`,
    /// rolled back on `Err`.
    pub fn update<T>(&self, f: impl FnOnce(&Txn<'_>) -> Result<T, CoreError>) -> Result<T, CoreError> {
        let mut conn = self.writer.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| CoreError::Internal(format!("begin write txn: {}", e)))?;
        let result = f(&Txn::new(&tx));
        match result {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| CoreError::Internal(format!("commit: {}", e)))?;
                Ok(value)
            }
            Err(err) => {
                // Rollback happens on drop; surface the closure's error.
                Err(err)
            }
        }
    }

    /// Run `f` with a read snapshot. Runs on its own connection, so it
    /// never waits on the writer or on other readers.
    pub fn view<T>(&self, f: impl FnOnce(&Txn<'_>) -> Result<T, CoreError>) -> Result<T, CoreError> {
        let mut conn = self.checkout_reader()?;
        let result = {
            let tx = conn
                .transaction()
                .map_err(|e| CoreError::Internal(format!("begin read txn: {}", e)))?;
            let result = f(&Txn::new(&tx));
            // Read-only; commit vs rollback is equivalent, commit is cheaper.
            let _ = tx.commit();
            result
        };
        self.readers.lock().push(conn);
        result
    }

    /// Take a pooled reader connection, opening a fresh one when the
    /// pool is dry.
    fn checkout_reader(&self) -> Result<Connection, CoreError> {
        if let Some(conn) = self.readers.lock().pop() {
            return Ok(conn);
        }
        let conn = match &*self.backing {
            Backing::File(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| CoreError::Internal(format!("open reader {}: {}", path.display(), e)))?,
            Backing::Memory(uri) => {
                let conn = Connection::open(uri)
                    .map_err(|e| CoreError::Internal(format!("open reader {}: {}", uri, e)))?;
                // Shared-cache readers take table locks; reading
                // uncommitted sidesteps them. Test-only backing.
                conn.execute_batch("PRAGMA read_uncommitted = true;")
                    .map_err(|e| CoreError::Internal(format!("reader pragma: {}", e)))?;
                conn
            }
        };
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| CoreError::Internal(format!("reader busy_timeout: {}", e)))?;
        Ok(conn)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
