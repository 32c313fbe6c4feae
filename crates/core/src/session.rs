// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User session record.

use crate::id::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a session. Exactly one session is active and
/// current per coordinator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Archived,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Archived => write!(f, "archived"),
        }
    }
}

/// A logical grouping of related tasks and conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Auto-set from the first task's title; empty until then.
    #[serde(default)]
    pub title: String,
    pub started_at_ms: u64,
    pub last_active_ms: u64,
    #[serde(default)]
    pub task_count: u64,
    pub status: SessionStatus,
}

impl Session {
    pub fn new(id: SessionId, now_ms: u64) -> Self {
        Self {
            id,
            title: String::new(),
            started_at_ms: now_ms,
            last_active_ms: now_ms,
            task_count: 0,
            status: SessionStatus::Active,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
