// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-management tools and cross-role consultation.
//!
//! These let the LLM enqueue work for agents, inspect the queue, and
//! ask another role a question. Consultation is a synchronous LLM call
//! against a role-prompted engine, not a task round-trip; the engine
//! side implements [`Consultant`].

use crate::tool::{parse_params, Tool, ToolContext, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use smith_core::{CoreError, EventDraft, EventType, Priority, Role, TaskId, TaskSpec, TaskStatus};
use std::sync::Arc;

/// Answers questions on behalf of a role. Implemented by the engine
/// layer; tools only see the trait.
#[async_trait]
pub trait Consultant: Send + Sync {
    async fn consult(&self, role: Role, question: &str) -> Result<String, CoreError>;
}

pub fn all() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(CreateTask),
        Arc::new(ListTasks),
        Arc::new(GetTask),
        Arc::new(GetTaskStats),
        Arc::new(ConsultAgent),
    ]
}

// ── create_task ─────────────────────────────────────────────────────────

pub struct CreateTask;

#[derive(Deserialize)]
struct CreateTaskParams {
    title: String,
    description: String,
    role: Role,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    depends_on: Vec<String>,
}

#[async_trait]
impl Tool for CreateTask {
    fn name(&self) -> &'static str {
        "create_task"
    }

    fn description(&self) -> &'static str {
        "Enqueue a task for a role-specific agent"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "description": {"type": "string"},
                "role": {"type": "string", "enum": ["planning", "implementation", "testing", "review"]},
                "priority": {"type": "integer", "description": "0=low, 1=medium, 2=high", "default": 1},
                "depends_on": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["title", "description", "role"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: CreateTaskParams = parse_params(self.name(), params)?;
        if let Some(priority) = p.priority {
            Priority::try_from(priority)
                .map_err(|e| CoreError::InvalidState(format!("create_task: {}", e)))?;
        }
        if p.title.trim().is_empty() {
            return Err(CoreError::InvalidState(
                "create_task: title must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            self.validate(&params)?;
            let p: CreateTaskParams = parse_params(self.name(), &params)?;
            let priority = match p.priority {
                Some(n) => Priority::try_from(n)
                    .map_err(|e| CoreError::InvalidState(format!("create_task: {}", e)))?,
                None => Priority::default(),
            };
            let spec = TaskSpec::new(p.title, p.description, p.role)
                .priority(priority)
                .depends_on(p.depends_on.into_iter().map(TaskId::new));
            let task = ctx.coordinator.create_task(spec, &ctx.agent_id)?;
            Ok(ToolResult::ok_with_data(
                format!("created {} ({}, {})", task.id, task.role, task.priority),
                json!({"task_id": task.id.as_str()}),
            ))
        };
        run().into()
    }
}

// ── list_tasks ──────────────────────────────────────────────────────────

pub struct ListTasks;

#[derive(Deserialize)]
struct ListTasksParams {
    #[serde(default)]
    status: Option<TaskStatus>,
}

#[async_trait]
impl Tool for ListTasks {
    fn name(&self) -> &'static str {
        "list_tasks"
    }

    fn description(&self) -> &'static str {
        "List tasks, optionally filtered by status"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "status": {"type": "string", "enum": ["backlog", "wip", "review", "done", "failed"]}
            }
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<ListTasksParams>(self.name(), params).map(|_| ())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: ListTasksParams = parse_params(self.name(), &params)?;
            let tasks = ctx.coordinator.tasks.list(p.status)?;
            let lines: Vec<String> = tasks
                .iter()
                .map(|t| {
                    format!(
                        "{} [{}] ({}, {}) {}",
                        t.id, t.status, t.role, t.priority, t.title
                    )
                })
                .collect();
            Ok(ToolResult::ok_with_data(
                lines.join("\n"),
                json!({"count": tasks.len()}),
            ))
        };
        run().into()
    }
}

// ── get_task ────────────────────────────────────────────────────────────

pub struct GetTask;

#[derive(Deserialize)]
struct GetTaskParams {
    id: String,
}

#[async_trait]
impl Tool for GetTask {
    fn name(&self) -> &'static str {
        "get_task"
    }

    fn description(&self) -> &'static str {
        "Fetch one task with its result, error, and memory"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"}
            },
            "required": ["id"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        parse_params::<GetTaskParams>(self.name(), params).map(|_| ())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let p: GetTaskParams = parse_params(self.name(), &params)?;
            let task = ctx.coordinator.tasks.get(&TaskId::new(p.id))?;
            let data = serde_json::to_value(&task)
                .map_err(|e| CoreError::Internal(format!("encode task: {}", e)))?;
            let mut output = format!(
                "{} [{}] ({}, {}) {}\n{}",
                task.id, task.status, task.role, task.priority, task.title, task.description
            );
            if !task.result.is_empty() {
                output.push_str(&format!("\nresult: {}", task.result));
            }
            if !task.error.is_empty() {
                output.push_str(&format!("\nlast error: {}", task.error));
            }
            if !task.memory.learnings.is_empty() {
                output.push_str(&format!("\nlearnings: {}", task.memory.learnings));
            }
            Ok(ToolResult::ok_with_data(output, data))
        };
        run().into()
    }
}

// ── get_task_stats ──────────────────────────────────────────────────────

pub struct GetTaskStats;

#[async_trait]
impl Tool for GetTaskStats {
    fn name(&self) -> &'static str {
        "get_task_stats"
    }

    fn description(&self) -> &'static str {
        "Task counts by status"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }

    fn validate(&self, _params: &serde_json::Value) -> Result<(), CoreError> {
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext, _params: serde_json::Value) -> ToolResult {
        let run = || -> Result<ToolResult, CoreError> {
            let stats = ctx.coordinator.task_stats()?;
            Ok(ToolResult::ok_with_data(
                format!(
                    "backlog: {}, wip: {}, review: {}, done: {}, failed: {}",
                    stats.backlog, stats.wip, stats.review, stats.done, stats.failed
                ),
                json!({
                    "backlog": stats.backlog,
                    "wip": stats.wip,
                    "review": stats.review,
                    "done": stats.done,
                    "failed": stats.failed
                }),
            ))
        };
        run().into()
    }
}

// ── consult_agent ───────────────────────────────────────────────────────

pub struct ConsultAgent;

#[derive(Deserialize)]
struct ConsultParams {
    role: Role,
    question: String,
}

#[async_trait]
impl Tool for ConsultAgent {
    fn name(&self) -> &'static str {
        "consult_agent"
    }

    fn description(&self) -> &'static str {
        "Ask an agent of another role a question and wait for the answer"
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "role": {"type": "string", "enum": ["planning", "implementation", "testing", "review"]},
                "question": {"type": "string"}
            },
            "required": ["role", "question"]
        })
    }

    fn validate(&self, params: &serde_json::Value) -> Result<(), CoreError> {
        let p: ConsultParams = parse_params(self.name(), params)?;
        if p.question.trim().is_empty() {
            return Err(CoreError::InvalidState(
                "consult_agent: question must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext, params: serde_json::Value) -> ToolResult {
        let p: ConsultParams = match parse_params::<ConsultParams>(self.name(), &params) {
            Ok(p) => p,
            Err(e) => return ToolResult::fail(e.to_string()),
        };
        let Some(consultant) = &ctx.consultant else {
            return ToolResult::fail("consultation is not available in this context");
        };

        let _ = ctx.coordinator.events.publish(
            EventType::AgentQuestion,
            EventDraft::from_agent(ctx.agent_id.clone())
                .datum("role", p.role.to_string())
                .datum("question", p.question.clone()),
        );

        match consultant.consult(p.role, &p.question).await {
            Ok(answer) => {
                let _ = ctx.coordinator.events.publish(
                    EventType::AgentResponse,
                    EventDraft::from_agent(ctx.agent_id.clone())
                        .datum("role", p.role.to_string()),
                );
                ToolResult::ok(answer)
            }
            Err(e) => ToolResult::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "task_tools_tests.rs"]
mod tests;
