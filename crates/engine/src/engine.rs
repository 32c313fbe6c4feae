// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversational driver.
//!
//! One engine owns one conversation: a system prompt, the turn history,
//! and the provider/tool wiring. `chat` loops provider → tool calls →
//! tool results until the model returns plain text or the turn cap is
//! hit. Token usage is rolled into the current session after every
//! provider call.

use crate::prompts;
use async_trait::async_trait;
use smith_core::{CoreError, Role};
use smith_provider::{ChatResponse, Message, Provider, StreamChunk, ToolCallRequest};
use smith_storage::Coordinator;
use smith_tools::{ToolContext, ToolRegistry};
use std::sync::Arc;

/// Cap on provider turns per `chat` call. Prevents a tool-calling loop
/// from running away.
pub const MAX_TOOL_TURNS: usize = 8;

/// Per-conversation driver.
pub struct Engine {
    provider: Arc<dyn Provider>,
    registry: ToolRegistry,
    ctx: ToolContext,
    history: Vec<Message>,
}

impl Engine {
    /// New engine with the given system prompt as the first history
    /// turn.
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
        ctx: ToolContext,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            registry,
            ctx,
            history: vec![Message::system(system_prompt)],
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Drop everything but the system prompt.
    pub fn reset(&mut self) {
        self.history.truncate(1);
    }

    /// Run one user message to a final text reply.
    pub async fn chat(&mut self, user_msg: impl Into<String>) -> Result<String, CoreError> {
        self.run(user_msg.into(), &mut |_chunk| {}).await
    }

    /// Like [`chat`](Self::chat) but forwards streamed content chunks.
    /// Tool execution happens synchronously between provider turns.
    pub async fn chat_stream(
        &mut self,
        user_msg: impl Into<String>,
        on_chunk: &mut (dyn FnMut(StreamChunk) + Send),
    ) -> Result<String, CoreError> {
        self.run(user_msg.into(), on_chunk).await
    }

    async fn run(
        &mut self,
        user_msg: String,
        on_chunk: &mut (dyn FnMut(StreamChunk) + Send),
    ) -> Result<String, CoreError> {
        self.history.push(Message::user(user_msg));
        let definitions = self.registry.definitions();

        for _turn in 0..MAX_TOOL_TURNS {
            let response = self
                .provider
                .chat_stream(&self.history, &definitions, on_chunk)
                .await?;
            self.record_usage(&response)?;

            let mut assistant = Message::assistant(response.content.clone());
            assistant.tool_calls = response.tool_calls.clone();
            self.history.push(assistant);

            if !response.has_tool_calls() {
                return Ok(response.content);
            }
            for call in &response.tool_calls {
                let result_text = self.execute_tool_call(call).await;
                self.history.push(Message::tool_result(&call.id, result_text));
            }
        }

        tracing::warn!(cap = MAX_TOOL_TURNS, "tool turn cap reached");
        Ok("Stopped after too many consecutive tool calls; the work so far is recorded above."
            .to_string())
    }

    /// Execute one tool call, returning the text the model will see.
    /// Every failure mode is data to the model, never an engine error.
    async fn execute_tool_call(&self, call: &ToolCallRequest) -> String {
        let Some(tool) = self.registry.get(&call.name) else {
            return format!("error: unknown tool {}", call.name);
        };

        if let smith_safety::Decision::Denied { reason } =
            self.ctx.policy.check_tool(&call.name, self.ctx.level)
        {
            return format!("error: {}", reason);
        }
        if tool.requires_confirmation(self.ctx.level) {
            // No interactive confirmer is wired in the core; the model
            // must use a tool admitted at the current level instead.
            return format!(
                "error: {} requires confirmation at level {} and no confirmation channel is attached",
                call.name, self.ctx.level
            );
        }
        if let Err(err) = tool.validate(&call.arguments) {
            return format!("error: {}", err);
        }

        tracing::debug!(tool = %call.name, "executing tool call");
        let result = tool.execute(&self.ctx, call.arguments.clone()).await;
        result.as_message()
    }

    fn record_usage(&self, response: &ChatResponse) -> Result<(), CoreError> {
        if response.usage.total_tokens == 0 {
            return Ok(());
        }
        let session_id = self.ctx.coordinator.current_session()?;
        self.ctx.coordinator.sessions.add_usage(
            &session_id,
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
        )?;
        Ok(())
    }
}

/// Answers `consult_agent` questions with a one-shot, role-prompted,
/// tool-less provider call.
pub struct RoleConsultant {
    provider: Arc<dyn Provider>,
    coordinator: Coordinator,
}

impl RoleConsultant {
    pub fn new(provider: Arc<dyn Provider>, coordinator: Coordinator) -> Self {
        Self {
            provider,
            coordinator,
        }
    }
}

#[async_trait]
impl smith_tools::Consultant for RoleConsultant {
    async fn consult(&self, role: Role, question: &str) -> Result<String, CoreError> {
        let messages = [
            Message::system(prompts::consult_system_prompt(role)),
            Message::user(question),
        ];
        let response = self.provider.chat(&messages, &[]).await?;
        if response.usage.total_tokens > 0 {
            let session_id = self.coordinator.current_session()?;
            self.coordinator.sessions.add_usage(
                &session_id,
                response.usage.prompt_tokens,
                response.usage.completion_tokens,
            )?;
        }
        Ok(response.content)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
