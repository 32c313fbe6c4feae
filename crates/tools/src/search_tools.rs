// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Search tools: content search, glob lookup, batch replace.
//!
//! Walks skip `.git`/`.smith` and known binary extensions. Content
//! search observes the context's cancellation flag between files.

use crate::tool::{parse_params, Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::json;
use smith_core::CoreError;
use smith_safety::AutoLevel;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result cap for `search_files` when the caller does not set one.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// File cap for `batch_search_replace`.
pub const DEFAULT_MAX_FILES: usize = 100;

const SKIP_DIRS: [&str; 4] = [".git", ".smith", "target", "node_modules"];

const BINARY_EXTENSIONS: [&str; 22] = [
    "png", "jpg", "jpeg", "gif", "ico", "pdf", "zip", "gz", "tar", "exe", "so", "dll", "o", "a",
    "bin", "class", "jar", "wasm", "woff", "woff2", "db", "sqlite",
];

pub fn all() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(SearchFiles),
        Arc::new(FindFilesByPattern),
        Arc::new(BatchSearchReplace),
    ]
}

fn is_binary(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| SKIP_DIRS.contains(&name))
}

/// Depth-first walk under `root`, files only, skipping ignored
/// directories. Stops early when `stop` returns true.
fn walk_files(
    root: &Path,
    stop: &mut dyn FnMut() -> bool,
    visit: &mut dyn FnMut(&Path),
) -> Result<(), CoreError> {
    let reader = std::fs::read_dir(root)
        .map_err(|e| CoreError::Internal(format!("walk {}: {}", root.display(), e)))?;
    let mut entries: Vec<PathBuf> = reader
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    for path in entries {
        if stop() {
            return Ok(());
        }
        if path.is_dir() {
            if !is_skipped_dir(&path) {
                walk_files(&path, stop, visit)?;
            }
        } else {
            visit(&path);
        }
    }
    Ok(())
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

// ── search_files ────────────────────────────────────────────────────────

pub struct SearchFiles;

#[derive(Deserialize)]
struct SearchParams {
    pattern: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    is_regex: bool,
    #[serde(default)]
    case_sensitive: bool,
    #[serde(default)]
    max_results: Option<usize>,
}

#[async_trait]
impl Tool for SearchFiles {
    fn name(&self) -> &'static str {
        "search_files"
    }

    fn description(&self) -> &'static str {
        "Search file contents for a text or regex pattern"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {"type": "string"},
                "path": {"type": "string", "description": "Subdirectory to search; defaults to the workspace root"},
                "is_regex": {"type": "boolean", "default": false},
                "case_sensitive": {"type": "boolean", "default": false},
                "max_results": {"type": "integer", "default": DEFAULT_MAX_RESULTS}
            },
            "required": ["pattern"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: SearchParams = parse_params(self.name(), params)?;
        if p.is_regex {
            RegexBuilder::new(&p.pattern)
                .build()
                .map_err(|e| CoreError::InvalidState(format!("search_files: bad regex: {}", e)))?;
        }
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: SearchParams = parse_params(self.name(), &params)?;
            let root = crate::path::resolve_in_workspace(
                &ctx.work_dir,
                p.path.as_deref().unwrap_or("."),
            )?;
            let cap = p.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

            // Literal patterns are compiled escaped so one matcher serves
            // both modes.
            let source = if p.is_regex {
                p.pattern.clone()
            } else {
                regex::escape(&p.pattern)
            };
            let matcher = RegexBuilder::new(&source)
                .case_insensitive(!p.case_sensitive)
                .build()
                .map_err(|e| CoreError::InvalidState(format!("search_files: bad regex: {}", e)))?;

            let mut hits: Vec<String> = Vec::new();
            let truncated = std::cell::Cell::new(false);
            walk_files(
                &root,
                &mut || ctx.is_cancelled() || truncated.get(),
                &mut |file| {
                    if is_binary(file) {
                        return;
                    }
                    let Ok(text) = std::fs::read_to_string(file) else {
                        return; // unreadable or non-UTF-8, skip
                    };
                    for (line_no, line) in text.lines().enumerate() {
                        if matcher.is_match(line) {
                            if hits.len() >= cap {
                                truncated.set(true);
                                return;
                            }
                            hits.push(format!(
                                "{}:{}: {}",
                                relative(&ctx.work_dir, file).display(),
                                line_no + 1,
                                line.trim_end()
                            ));
                        }
                    }
                },
            )?;

            if ctx.is_cancelled() {
                return Ok(ToolResult::fail("search cancelled"));
            }
            Ok(ToolResult::ok_with_data(
                hits.join("\n"),
                json!({"matches": hits.len(), "truncated": truncated.get()}),
            ))
        };
        run().into()
    }
}

// ── find_files_by_pattern ───────────────────────────────────────────────

pub struct FindFilesByPattern;

#[derive(Deserialize)]
struct FindParams {
    pattern: String,
    #[serde(default)]
    min_size: Option<u64>,
    #[serde(default)]
    max_size: Option<u64>,
    #[serde(default)]
    extensions: Option<Vec<String>>,
}

#[async_trait]
impl Tool for FindFilesByPattern {
    fn name(&self) -> &'static str {
        "find_files_by_pattern"
    }

    fn description(&self) -> &'static str {
        "Find workspace files by glob, with optional size and extension filters"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {"type": "string", "description": "Glob relative to the workspace root, e.g. src/**/*.rs"},
                "min_size": {"type": "integer"},
                "max_size": {"type": "integer"},
                "extensions": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["pattern"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: FindParams = parse_params(self.name(), params)?;
        glob::Pattern::new(&p.pattern)
            .map_err(|e| CoreError::InvalidState(format!("find_files_by_pattern: bad glob: {}", e)))?;
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: FindParams = parse_params(self.name(), &params)?;
            let pattern = glob::Pattern::new(&p.pattern).map_err(|e| {
                CoreError::InvalidState(format!("find_files_by_pattern: bad glob: {}", e))
            })?;
            let extensions: Option<Vec<String>> = p
                .extensions
                .map(|exts| exts.iter().map(|e| e.trim_start_matches('.').to_ascii_lowercase()).collect());

            let mut found: Vec<String> = Vec::new();
            walk_files(&ctx.work_dir, &mut || ctx.is_cancelled(), &mut |file| {
                let rel = relative(&ctx.work_dir, file);
                if !pattern.matches_path(rel) {
                    return;
                }
                if let Some(exts) = &extensions {
                    let matches_ext = file
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|ext| exts.contains(&ext.to_ascii_lowercase()));
                    if !matches_ext {
                        return;
                    }
                }
                if p.min_size.is_some() || p.max_size.is_some() {
                    let Ok(metadata) = file.metadata() else {
                        return;
                    };
                    let size = metadata.len();
                    if p.min_size.is_some_and(|min| size < min)
                        || p.max_size.is_some_and(|max| size > max)
                    {
                        return;
                    }
                }
                found.push(rel.display().to_string());
            })?;

            found.sort();
            Ok(ToolResult::ok_with_data(
                found.join("\n"),
                json!({"count": found.len()}),
            ))
        };
        run().into()
    }
}

// ── batch_search_replace ────────────────────────────────────────────────

pub struct BatchSearchReplace;

#[derive(Deserialize)]
struct BatchParams {
    old_text: String,
    new_text: String,
    file_pattern: String,
    #[serde(default)]
    max_files: Option<usize>,
}

#[async_trait]
impl Tool for BatchSearchReplace {
    fn name(&self) -> &'static str {
        "batch_search_replace"
    }

    fn description(&self) -> &'static str {
        "Replace a text across every workspace file matching a glob"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "old_text": {"type": "string"},
                "new_text": {"type": "string"},
                "file_pattern": {"type": "string"},
                "max_files": {"type": "integer", "default": DEFAULT_MAX_FILES}
            },
            "required": ["old_text", "new_text", "file_pattern"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: BatchParams = parse_params(self.name(), params)?;
        if p.old_text.is_empty() {
            return Err(CoreError::InvalidState(
                "batch_search_replace: old_text must not be empty".to_string(),
            ));
        }
        glob::Pattern::new(&p.file_pattern)
            .map_err(|e| CoreError::InvalidState(format!("batch_search_replace: bad glob: {}", e)))?;
        Ok(())
    }

    fn requires_confirmation(&self, level: AutoLevel) -> bool {
        level < AutoLevel::Medium
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            self.validate(&params)?;
            let p: BatchParams = parse_params(self.name(), &params)?;
            let cap = p.max_files.unwrap_or(DEFAULT_MAX_FILES);
            let pattern = glob::Pattern::new(&p.file_pattern).map_err(|e| {
                CoreError::InvalidState(format!("batch_search_replace: bad glob: {}", e))
            })?;

            let mut candidates: Vec<PathBuf> = Vec::new();
            walk_files(&ctx.work_dir, &mut || ctx.is_cancelled(), &mut |file| {
                if !is_binary(file) && pattern.matches_path(relative(&ctx.work_dir, file)) {
                    candidates.push(file.to_path_buf());
                }
            })?;
            if candidates.len() > cap {
                return Ok(ToolResult::fail(format!(
                    "{} matching files exceed the cap of {}; nothing changed",
                    candidates.len(),
                    cap
                )));
            }

            // Per-file atomicity only: a file that cannot be read or
            // locked is skipped and reported, the rest proceed.
            let mut changed: Vec<String> = Vec::new();
            let mut skipped: Vec<String> = Vec::new();
            for file in candidates {
                let rel = relative(&ctx.work_dir, &file).display().to_string();
                let Ok(text) = std::fs::read_to_string(&file) else {
                    skipped.push(rel);
                    continue;
                };
                if !text.contains(&p.old_text) {
                    continue;
                }
                if ctx.lock_file(&file).is_err() {
                    skipped.push(rel);
                    continue;
                }
                let updated = text.replace(&p.old_text, &p.new_text);
                std::fs::write(&file, updated)
                    .map_err(|e| CoreError::Internal(format!("write {}: {}", rel, e)))?;
                changed.push(rel);
            }

            let mut output = format!("replaced in {} files", changed.len());
            if !skipped.is_empty() {
                output.push_str(&format!(", skipped {}", skipped.len()));
            }
            Ok(ToolResult::ok_with_data(
                output,
                json!({"changed": changed, "skipped": skipped}),
            ))
        };
        run().into()
    }
}

#[cfg(test)]
#[path = "search_tools_tests.rs"]
mod tests;
