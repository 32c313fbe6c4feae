// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background worker agent.
//!
//! Claim → execute → publish: each iteration heartbeats, picks the best
//! available task for its role, claims it (racing peers), drives a
//! fresh engine to completion, then completes or fails the task and
//! releases every file lock it took. Shutdown is cooperative via a
//! shared `Notify`; the current iteration finishes before the agent
//! unregisters.

use crate::engine::Engine;
use crate::prompts;
use smith_core::{AgentId, CoreError, EventDraft, EventType, Role, Task};
use smith_provider::Provider;
use smith_storage::Coordinator;
use smith_tools::{ToolContext, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Delay between starting successive agents, to spread cold-start lock
/// contention on the shared store.
pub const STAGGER_MS: u64 = 250;

/// How many recent same-role tasks feed the memory section of the
/// prompt.
const MEMORY_WINDOW: usize = 5;

/// A role-specific worker.
pub struct Agent {
    agent_id: AgentId,
    role: Role,
    poll_interval: Duration,
    coordinator: Coordinator,
    provider: Arc<dyn Provider>,
    registry: ToolRegistry,
    ctx_template: ToolContext,
    shutdown: Arc<Notify>,
}

/// Handle for stopping a spawned agent.
pub struct AgentHandle {
    pub agent_id: AgentId,
    shutdown: Arc<Notify>,
    join: tokio::task::JoinHandle<()>,
}

impl AgentHandle {
    /// Request shutdown and wait for the loop to finish its iteration.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        let _ = self.join.await;
    }
}

impl Agent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        agent_id: AgentId,
        role: Role,
        poll_interval: Duration,
        coordinator: Coordinator,
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
        ctx_template: ToolContext,
    ) -> Self {
        Self {
            agent_id,
            role,
            poll_interval,
            coordinator,
            provider,
            registry,
            ctx_template,
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Register and run the poll loop until shutdown. `start_index`
    /// staggers multi-agent cold start.
    pub async fn run(self, start_index: usize) -> Result<(), CoreError> {
        self.coordinator
            .registry
            .register(&self.agent_id, self.role, std::process::id())?;

        let stagger = Duration::from_millis(STAGGER_MS * start_index as u64);
        if !stagger.is_zero() {
            tokio::time::sleep(stagger).await;
        }
        tracing::info!(agent = %self.agent_id, role = %self.role, "agent loop started");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => break,
                result = self.iterate() => {
                    match result {
                        // Idle: nothing claimable, wait out the poll interval
                        // (interruptible by shutdown).
                        Ok(false) => {
                            tokio::select! {
                                _ = self.shutdown.notified() => break,
                                _ = tokio::time::sleep(self.poll_interval) => {}
                            }
                        }
                        Ok(true) => {}
                        Err(err) => {
                            // Iteration errors never crash the loop.
                            tracing::error!(agent = %self.agent_id, error = %err, "iteration failed");
                            tokio::select! {
                                _ = self.shutdown.notified() => break,
                                _ = tokio::time::sleep(self.poll_interval) => {}
                            }
                        }
                    }
                }
            }
        }

        self.coordinator.registry.unregister(&self.agent_id)?;
        tracing::info!(agent = %self.agent_id, "agent loop stopped");
        Ok(())
    }

    /// Spawn onto the runtime, returning a stop handle.
    pub fn spawn(self, start_index: usize) -> AgentHandle {
        let agent_id = self.agent_id.clone();
        let shutdown = self.shutdown.clone();
        let loop_id = agent_id.clone();
        let join = tokio::spawn(async move {
            if let Err(err) = self.run(start_index).await {
                tracing::error!(agent = %loop_id, error = %err, "agent exited with error");
            }
        });
        AgentHandle {
            agent_id,
            shutdown,
            join,
        }
    }

    /// One poll iteration. Returns whether a task was executed.
    pub async fn iterate(&self) -> Result<bool, CoreError> {
        self.coordinator.registry.heartbeat(&self.agent_id)?;

        let available = self.coordinator.available_tasks(self.role)?;
        let Some(candidate) = available.into_iter().next() else {
            return Ok(false);
        };

        let task = match self.coordinator.tasks.claim(&candidate.id, &self.agent_id) {
            Ok(task) => task,
            // Another agent won the race; back off briefly and re-poll.
            Err(CoreError::InvalidState(_)) | Err(CoreError::Conflict(_)) => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        self.coordinator
            .registry
            .set_task(&self.agent_id, Some(task.id.clone()))?;

        let outcome = self.execute_task(&task).await;

        match outcome {
            Ok(result) => {
                self.coordinator.tasks.complete(&task.id, result, None)?;
            }
            Err(err) => {
                self.coordinator
                    .tasks
                    .fail(&task.id, err.to_string(), None)?;
            }
        }
        // Locks drop whether the task succeeded or not.
        self.coordinator.locks.release_all(&self.agent_id)?;
        self.coordinator.registry.set_task(&self.agent_id, None)?;
        Ok(true)
    }

    /// Drive a fresh engine through the task.
    async fn execute_task(&self, task: &Task) -> Result<String, CoreError> {
        let recent = self.coordinator.tasks.recent(Some(self.role), MEMORY_WINDOW)?;
        let system_prompt =
            prompts::agent_system_prompt(self.role, task, &recent, &self.registry.inventory());

        let ctx = self
            .ctx_template
            .clone()
            .with_role(self.role)
            .with_task(task.id.clone());
        let mut engine = Engine::new(
            self.provider.clone(),
            self.registry.clone(),
            ctx,
            system_prompt,
        );

        let _ = self.coordinator.events.publish(
            EventType::AgentMessage,
            EventDraft::from_agent(self.agent_id.clone())
                .role(self.role)
                .task(task.id.clone())
                .datum("message", format!("starting {}", task.id)),
        );

        engine
            .chat(format!(
                "Work on task {} now: {}\n\n{}",
                task.id, task.title, task.description
            ))
            .await
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
