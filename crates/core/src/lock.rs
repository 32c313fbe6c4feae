// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive file lock record.

use crate::id::{AgentId, TaskId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ownership record for a workspace file. At most one lock exists per
/// path; the path is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLock {
    pub file_path: PathBuf,
    pub agent_id: AgentId,
    pub task_id: TaskId,
    pub locked_at_ms: u64,
}
