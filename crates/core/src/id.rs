// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID newtypes and generation.
//!
//! Task and session ids are human-readable and stable (`task-001`,
//! `session-2026-08-01-001`); agent ids are per-process and carry the
//! role for log readability (`implementation-1a2b3c4d`).

use crate::role::Role;
use chrono::NaiveDate;

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Stable identifier for a task (`task-001`).
    ///
    /// Assigned by the task store from the persistent task count; never
    /// reused within a store file.
    #[derive(Default)]
    pub struct TaskId;
}

define_id! {
    /// Identifier for a user session (`session-2026-08-01-001`).
    #[derive(Default)]
    pub struct SessionId;
}

define_id! {
    /// Per-process identifier for a worker agent.
    ///
    /// Agents have no cross-restart identity; a fresh id is generated at
    /// registration time.
    #[derive(Default)]
    pub struct AgentId;
}

/// Format the task id for a given 1-based task ordinal.
pub fn next_task_id(count: u64) -> TaskId {
    TaskId::new(format!("task-{:03}", count))
}

/// Format the session id for a given day and 1-based ordinal within it.
pub fn session_id_for_day(day: NaiveDate, ordinal: u32) -> SessionId {
    SessionId::new(format!("session-{}-{:03}", day.format("%Y-%m-%d"), ordinal))
}

/// Generates unique identifiers
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> String;
}

/// UUID-based ID generator for production use
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

impl UuidIdGen {
    /// Generate an agent id carrying the role as prefix.
    pub fn agent_id(&self, role: Role) -> AgentId {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        AgentId::new(format!("{}-{}", role, &suffix[..8]))
    }
}

/// Sequential ID generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: std::sync::Arc::new(std::sync::atomic::AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
