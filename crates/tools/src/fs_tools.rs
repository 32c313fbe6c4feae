// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File tools: read, write, edit, move, delete, list, diff.
//!
//! Mutating tools acquire the file lock before touching bytes and write
//! whole files, so a failed call leaves the file byte-identical. Edits
//! read, check, and write on the same snapshot; `replace_in_file`
//! refuses ambiguity (zero or multiple matches) instead of guessing.

use crate::tool::{parse_params, Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use smith_core::CoreError;
use smith_safety::AutoLevel;
use std::path::Path;
use std::sync::Arc;

/// Cap for `replace_all_in_file` when the caller does not set one.
pub const DEFAULT_MAX_REPLACEMENTS: usize = 100;

/// All file tools, for registry construction.
pub fn all() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ReadFile),
        Arc::new(ReadFileLines),
        Arc::new(WriteFile),
        Arc::new(AppendToFile),
        Arc::new(ReplaceInFile),
        Arc::new(ReplaceAllInFile),
        Arc::new(MoveFile),
        Arc::new(DeleteFile),
        Arc::new(ListFiles),
        Arc::new(FileExists),
        Arc::new(DiffFiles),
    ]
}

fn read_text(path: &Path) -> Result<String, CoreError> {
    std::fs::read_to_string(path)
        .map_err(|e| CoreError::Internal(format!("read {}: {}", path.display(), e)))
}

fn write_text(path: &Path, content: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CoreError::Internal(format!("create {}: {}", parent.display(), e)))?;
    }
    std::fs::write(path, content)
        .map_err(|e| CoreError::Internal(format!("write {}: {}", path.display(), e)))
}

/// Resolve, lock, and return the target of a mutating file tool.
fn resolve_for_edit(ctx: &ToolContext, path: &str) -> Result<std::path::PathBuf, CoreError> {
    let resolved = crate::path::resolve_in_workspace(&ctx.work_dir, path)?;
    ctx.lock_file(&resolved)?;
    Ok(resolved)
}

// ── read_file ───────────────────────────────────────────────────────────

pub struct ReadFile;

#[derive(Deserialize)]
struct PathParams {
    path: String,
}

#[async_trait]
impl Tool for ReadFile {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read the entire contents of a file"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "File path relative to the workspace"}
            },
            "required": ["path"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<PathParams>(self.name(), params).map(|_| ())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let params: PathParams = parse_params(self.name(), &params)?;
            let path = crate::path::resolve_in_workspace(&ctx.work_dir, &params.path)?;
            Ok(ToolResult::ok(read_text(&path)?))
        };
        run().into()
    }
}

// ── read_file_lines ─────────────────────────────────────────────────────

pub struct ReadFileLines;

#[derive(Deserialize)]
struct ReadLinesParams {
    path: String,
    /// 1-based, inclusive.
    start: usize,
    end: usize,
}

#[async_trait]
impl Tool for ReadFileLines {
    fn name(&self) -> &'static str {
        "read_file_lines"
    }

    fn description(&self) -> &'static str {
        "Read a 1-based inclusive line range of a file"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "start": {"type": "integer", "minimum": 1},
                "end": {"type": "integer", "minimum": 1}
            },
            "required": ["path", "start", "end"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: ReadLinesParams = parse_params(self.name(), params)?;
        if p.start == 0 || p.end < p.start {
            return Err(CoreError::InvalidState(format!(
                "read_file_lines: bad range {}..{}",
                p.start, p.end
            )));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            self.validate(&params)?;
            let p: ReadLinesParams = parse_params(self.name(), &params)?;
            let path = crate::path::resolve_in_workspace(&ctx.work_dir, &p.path)?;
            let text = read_text(&path)?;
            let lines: Vec<&str> = text
                .lines()
                .skip(p.start - 1)
                .take(p.end - p.start + 1)
                .collect();
            Ok(ToolResult::ok_with_data(
                lines.join("\n"),
                json!({"lines": lines.len()}),
            ))
        };
        run().into()
    }
}

// ── write_file ──────────────────────────────────────────────────────────

pub struct WriteFile;

#[derive(Deserialize)]
struct WriteParams {
    path: String,
    content: String,
}

#[async_trait]
impl Tool for WriteFile {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write a file, creating parent directories as needed"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["path", "content"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<WriteParams>(self.name(), params).map(|_| ())
    }

    fn requires_confirmation(&self, level: AutoLevel) -> bool {
        level < AutoLevel::Medium
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: WriteParams = parse_params(self.name(), &params)?;
            let path = resolve_for_edit(ctx, &p.path)?;
            write_text(&path, &p.content)?;
            Ok(ToolResult::ok_with_data(
                format!("wrote {} bytes to {}", p.content.len(), p.path),
                json!({"bytes": p.content.len()}),
            ))
        };
        run().into()
    }
}

// ── append_to_file ──────────────────────────────────────────────────────

pub struct AppendToFile;

#[async_trait]
impl Tool for AppendToFile {
    fn name(&self) -> &'static str {
        "append_to_file"
    }

    fn description(&self) -> &'static str {
        "Append content to a file, creating it if missing"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["path", "content"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<WriteParams>(self.name(), params).map(|_| ())
    }

    fn requires_confirmation(&self, level: AutoLevel) -> bool {
        level < AutoLevel::Medium
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: WriteParams = parse_params(self.name(), &params)?;
            let path = resolve_for_edit(ctx, &p.path)?;
            let mut text = if path.exists() {
                read_text(&path)?
            } else {
                String::new()
            };
            text.push_str(&p.content);
            write_text(&path, &text)?;
            Ok(ToolResult::ok(format!(
                "appended {} bytes to {}",
                p.content.len(),
                p.path
            )))
        };
        run().into()
    }
}

// ── replace_in_file ─────────────────────────────────────────────────────

pub struct ReplaceInFile;

#[derive(Deserialize)]
struct ReplaceParams {
    path: String,
    old_text: String,
    new_text: String,
}

#[async_trait]
impl Tool for ReplaceInFile {
    fn name(&self) -> &'static str {
        "replace_in_file"
    }

    fn description(&self) -> &'static str {
        "Replace text that occurs exactly once in a file"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "old_text": {"type": "string"},
                "new_text": {"type": "string"}
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: ReplaceParams = parse_params(self.name(), params)?;
        if p.old_text.is_empty() {
            return Err(CoreError::InvalidState(
                "replace_in_file: old_text must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn requires_confirmation(&self, level: AutoLevel) -> bool {
        level < AutoLevel::Medium
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            self.validate(&params)?;
            let p: ReplaceParams = parse_params(self.name(), &params)?;
            let path = resolve_for_edit(ctx, &p.path)?;
            let text = read_text(&path)?;

            let count = text.matches(&p.old_text).count();
            if count != 1 {
                // Ambiguity is an error, not a guess. The file is untouched.
                return Ok(ToolResult::fail(format!(
                    "old_text appears {} times in {}; it must appear exactly once",
                    count, p.path
                )));
            }
            let updated = text.replacen(&p.old_text, &p.new_text, 1);
            write_text(&path, &updated)?;
            Ok(ToolResult::ok(format!("replaced 1 occurrence in {}", p.path)))
        };
        run().into()
    }
}

// ── replace_all_in_file ─────────────────────────────────────────────────

pub struct ReplaceAllInFile;

#[derive(Deserialize)]
struct ReplaceAllParams {
    path: String,
    old_text: String,
    new_text: String,
    max_replacements: Option<usize>,
}

#[async_trait]
impl Tool for ReplaceAllInFile {
    fn name(&self) -> &'static str {
        "replace_all_in_file"
    }

    fn description(&self) -> &'static str {
        "Replace every occurrence of a text in a file, up to a cap"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "old_text": {"type": "string"},
                "new_text": {"type": "string"},
                "max_replacements": {"type": "integer", "default": DEFAULT_MAX_REPLACEMENTS}
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: ReplaceAllParams = parse_params(self.name(), params)?;
        if p.old_text.is_empty() {
            return Err(CoreError::InvalidState(
                "replace_all_in_file: old_text must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn requires_confirmation(&self, level: AutoLevel) -> bool {
        level < AutoLevel::Medium
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            self.validate(&params)?;
            let p: ReplaceAllParams = parse_params(self.name(), &params)?;
            let cap = p.max_replacements.unwrap_or(DEFAULT_MAX_REPLACEMENTS);
            let path = resolve_for_edit(ctx, &p.path)?;
            let text = read_text(&path)?;

            let count = text.matches(&p.old_text).count();
            if count == 0 {
                return Ok(ToolResult::fail(format!(
                    "old_text not found in {}",
                    p.path
                )));
            }
            if count > cap {
                return Ok(ToolResult::fail(format!(
                    "{} matches exceed the cap of {}; file unchanged",
                    count, cap
                )));
            }
            let updated = text.replace(&p.old_text, &p.new_text);
            write_text(&path, &updated)?;
            Ok(ToolResult::ok_with_data(
                format!("replaced {} occurrences in {}", count, p.path),
                json!({"replacements": count}),
            ))
        };
        run().into()
    }
}

// ── move_file ───────────────────────────────────────────────────────────

pub struct MoveFile;

#[derive(Deserialize)]
struct MoveParams {
    from: String,
    to: String,
}

#[async_trait]
impl Tool for MoveFile {
    fn name(&self) -> &'static str {
        "move_file"
    }

    fn description(&self) -> &'static str {
        "Move or rename a file inside the workspace"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "from": {"type": "string"},
                "to": {"type": "string"}
            },
            "required": ["from", "to"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<MoveParams>(self.name(), params).map(|_| ())
    }

    fn requires_confirmation(&self, level: AutoLevel) -> bool {
        level < AutoLevel::Medium
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: MoveParams = parse_params(self.name(), &params)?;
            let from = resolve_for_edit(ctx, &p.from)?;
            let to = resolve_for_edit(ctx, &p.to)?;
            if let Some(parent) = to.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CoreError::Internal(format!("create {}: {}", parent.display(), e)))?;
            }
            std::fs::rename(&from, &to)
                .map_err(|e| CoreError::Internal(format!("move {}: {}", p.from, e)))?;
            Ok(ToolResult::ok(format!("moved {} to {}", p.from, p.to)))
        };
        run().into()
    }
}

// ── delete_file ─────────────────────────────────────────────────────────

pub struct DeleteFile;

#[async_trait]
impl Tool for DeleteFile {
    fn name(&self) -> &'static str {
        "delete_file"
    }

    fn description(&self) -> &'static str {
        "Delete a file or an empty directory (never recursive)"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"}
            },
            "required": ["path"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<PathParams>(self.name(), params).map(|_| ())
    }

    fn requires_confirmation(&self, level: AutoLevel) -> bool {
        level < AutoLevel::Medium
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: PathParams = parse_params(self.name(), &params)?;
            let path = resolve_for_edit(ctx, &p.path)?;
            if path.is_dir() {
                std::fs::remove_dir(&path).map_err(|e| {
                    CoreError::Internal(format!(
                        "delete {}: {} (directories must be empty)",
                        p.path, e
                    ))
                })?;
            } else {
                std::fs::remove_file(&path)
                    .map_err(|e| CoreError::Internal(format!("delete {}: {}", p.path, e)))?;
            }
            Ok(ToolResult::ok(format!("deleted {}", p.path)))
        };
        run().into()
    }
}

// ── list_files ──────────────────────────────────────────────────────────

pub struct ListFiles;

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    path: Option<String>,
}

#[async_trait]
impl Tool for ListFiles {
    fn name(&self) -> &'static str {
        "list_files"
    }

    fn description(&self) -> &'static str {
        "List directory entries (non-recursive)"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Defaults to the workspace root"}
            }
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<ListParams>(self.name(), params).map(|_| ())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: ListParams = parse_params(self.name(), &params)?;
            let dir = crate::path::resolve_in_workspace(
                &ctx.work_dir,
                p.path.as_deref().unwrap_or("."),
            )?;
            let mut entries = Vec::new();
            let reader = std::fs::read_dir(&dir)
                .map_err(|e| CoreError::Internal(format!("list {}: {}", dir.display(), e)))?;
            for entry in reader {
                let entry =
                    entry.map_err(|e| CoreError::Internal(format!("list entry: {}", e)))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.path().is_dir() {
                    entries.push(format!("{}/", name));
                } else {
                    entries.push(name);
                }
            }
            entries.sort();
            Ok(ToolResult::ok_with_data(
                entries.join("\n"),
                json!({"count": entries.len()}),
            ))
        };
        run().into()
    }
}

// ── file_exists ─────────────────────────────────────────────────────────

pub struct FileExists;

#[async_trait]
impl Tool for FileExists {
    fn name(&self) -> &'static str {
        "file_exists"
    }

    fn description(&self) -> &'static str {
        "Check whether a path exists in the workspace"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"}
            },
            "required": ["path"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<PathParams>(self.name(), params).map(|_| ())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: PathParams = parse_params(self.name(), &params)?;
            let path = crate::path::resolve_in_workspace(&ctx.work_dir, &p.path)?;
            let exists = path.exists();
            Ok(ToolResult::ok_with_data(
                if exists { "exists" } else { "missing" },
                json!({"exists": exists}),
            ))
        };
        run().into()
    }
}

// ── diff_files ──────────────────────────────────────────────────────────

pub struct DiffFiles;

#[derive(Deserialize)]
struct DiffParams {
    a: String,
    b: String,
}

#[async_trait]
impl Tool for DiffFiles {
    fn name(&self) -> &'static str {
        "diff_files"
    }

    fn description(&self) -> &'static str {
        "Line-by-line comparison of two files"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "string"}
            },
            "required": ["a", "b"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<DiffParams>(self.name(), params).map(|_| ())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: DiffParams = parse_params(self.name(), &params)?;
            let a = read_text(&crate::path::resolve_in_workspace(&ctx.work_dir, &p.a)?)?;
            let b = read_text(&crate::path::resolve_in_workspace(&ctx.work_dir, &p.b)?)?;
            let diff = diff_lines(&a, &b);
            let changed = !diff.is_empty();
            Ok(ToolResult::ok_with_data(
                if changed {
                    diff.join("\n")
                } else {
                    "files are identical".to_string()
                },
                json!({"changed": changed}),
            ))
        };
        run().into()
    }
}

/// Positional line comparison: differing lines are reported as a
/// removal/addition pair, trailing extra lines one-sided.
fn diff_lines(a: &str, b: &str) -> Vec<String> {
    let a_lines: Vec<&str> = a.lines().collect();
    let b_lines: Vec<&str> = b.lines().collect();
    let mut out = Vec::new();
    for i in 0..a_lines.len().max(b_lines.len()) {
        match (a_lines.get(i), b_lines.get(i)) {
            (Some(la), Some(lb)) if la == lb => {}
            (Some(la), Some(lb)) => {
                out.push(format!("{}c -{}", i + 1, la));
                out.push(format!("{}c +{}", i + 1, lb));
            }
            (Some(la), None) => out.push(format!("{}d -{}", i + 1, la)),
            (None, Some(lb)) => out.push(format!("{}a +{}", i + 1, lb)),
            (None, None) => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "fs_tools_tests.rs"]
mod tests;
