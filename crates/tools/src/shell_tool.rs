// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell command execution behind the safety policy.
//!
//! The policy decision happens before any process is spawned; a denied
//! command produces a failed tool result and nothing else. Commands run
//! through `sh -c` in the workspace with a timeout; the child is killed
//! when the timeout elapses.

use crate::tool::{parse_params, Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use smith_core::CoreError;
use smith_safety::{AutoLevel, Decision};
use std::time::Duration;
use tokio::process::Command;

/// Safety net for runaway commands.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error. The child process is
/// killed automatically when the timeout elapses (tokio `Child` kills
/// on drop).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<std::process::Output, String> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

pub struct RunCommand;

#[derive(Deserialize)]
struct RunParams {
    command: String,
}

#[async_trait]
impl Tool for RunCommand {
    fn name(&self) -> &'static str {
        "run_command"
    }

    fn description(&self) -> &'static str {
        "Run a shell command in the workspace (subject to the safety policy)"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {"type": "string"}
            },
            "required": ["command"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: RunParams = parse_params(self.name(), params)?;
        if p.command.trim().is_empty() {
            return Err(CoreError::InvalidState(
                "run_command: command must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn requires_confirmation(&self, level: AutoLevel) -> bool {
        level < AutoLevel::High
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let p: RunParams = match parse_params::<RunParams>(self.name(), &params) {
            Ok(p) => p,
            Err(e) => return ToolResult::fail(e.to_string()),
        };

        // Policy gate first; a denial never spawns a process.
        match ctx.policy.check_command(&p.command, ctx.level) {
            Decision::Allowed { rule } => {
                tracing::debug!(command = %p.command, %rule, "command allowed");
            }
            Decision::Denied { reason } => {
                tracing::warn!(command = %p.command, %reason, "command denied");
                return ToolResult::fail(format!("denied by safety policy: {}", reason));
            }
        }

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&p.command).current_dir(&ctx.work_dir);
        match run_with_timeout(cmd, COMMAND_TIMEOUT, "command").await {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let code = output.status.code();
                let mut text = stdout;
                if !stderr.is_empty() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&stderr);
                }
                if output.status.success() {
                    ToolResult::ok_with_data(text, json!({"exit_code": code}))
                } else {
                    ToolResult {
                        success: false,
                        output: text,
                        data: json!({"exit_code": code}),
                        error: Some(format!(
                            "command exited with status {}",
                            code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string())
                        )),
                    }
                }
            }
            Err(message) => ToolResult::fail(message),
        }
    }
}

#[cfg(test)]
#[path = "shell_tool_tests.rs"]
mod tests;
