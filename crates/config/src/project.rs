// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project `.smith/` directory bootstrap.

use smith_core::CoreError;
use std::path::{Path, PathBuf};

const GITIGNORE: &str = "# generated by smith\nsmith.db\nsmith.db-wal\nsmith.db-shm\nconfig.yaml\n";

/// `<project>/.smith`
pub fn smith_dir(project_root: &Path) -> PathBuf {
    project_root.join(".smith")
}

/// `<project>/.smith/smith.db`
pub fn store_path(project_root: &Path) -> PathBuf {
    smith_dir(project_root).join("smith.db")
}

/// Create the project `.smith/` directory and its `.gitignore`.
/// Idempotent; an existing `.gitignore` is left alone.
pub fn init_project_dir(project_root: &Path) -> Result<PathBuf, CoreError> {
    let dir = smith_dir(project_root);
    std::fs::create_dir_all(&dir)
        .map_err(|e| CoreError::Internal(format!("create {}: {}", dir.display(), e)))?;

    let gitignore = dir.join(".gitignore");
    if !gitignore.exists() {
        std::fs::write(&gitignore, GITIGNORE)
            .map_err(|e| CoreError::Internal(format!("write {}: {}", gitignore.display(), e)))?;
        tracing::info!(dir = %dir.display(), "initialized project state dir");
    }
    Ok(dir)
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
