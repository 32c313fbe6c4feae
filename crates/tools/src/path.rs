// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace path containment.
//!
//! Targets may not exist yet (write_file creates them), so containment
//! is checked lexically: the path is joined to the workspace root,
//! `.`/`..` components are resolved, and the result must still start
//! with the root. Symlinked escapes are out of scope; the check guards
//! against the LLM traversing out with `..`.

use smith_core::CoreError;
use std::path::{Component, Path, PathBuf};

/// Resolve `candidate` (absolute or workspace-relative) to an absolute
/// path inside `work_dir`, or fail with `InvalidPath`.
pub fn resolve_in_workspace(work_dir: &Path, candidate: &str) -> Result<PathBuf, CoreError> {
    let raw = Path::new(candidate);
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        work_dir.join(raw)
    };

    let normalized = normalize(&joined)?;
    if !normalized.starts_with(work_dir) {
        return Err(CoreError::InvalidPath(PathBuf::from(candidate)));
    }
    Ok(normalized)
}

/// Resolve `..` and `.` without touching the filesystem. A `..` that
/// pops past the root is an escape attempt.
fn normalize(path: &Path) -> Result<PathBuf, CoreError> {
    let mut parts: Vec<std::ffi::OsString> = Vec::new();
    let mut prefix = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => prefix.push(p.as_os_str()),
            Component::RootDir => prefix.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(CoreError::InvalidPath(path.to_path_buf()));
                }
            }
            Component::Normal(part) => parts.push(part.to_os_string()),
        }
    }
    let mut result = prefix;
    for part in parts {
        result.push(part);
    }
    Ok(result)
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
