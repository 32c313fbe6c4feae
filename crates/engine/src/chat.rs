// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground chat session.
//!
//! Thin wrapper over an [`Engine`] with the chat system prompt. The
//! model decides whether to answer directly or enqueue work for the
//! background agents with `create_task`; the UI polls the event bus in
//! parallel to render sidebar activity.

use crate::engine::Engine;
use crate::error::user_facing_message;
use crate::prompts;
use smith_provider::{Message, Provider, StreamChunk};
use smith_tools::{ToolContext, ToolRegistry};
use std::sync::Arc;

pub struct ChatSession {
    engine: Engine,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>, registry: ToolRegistry, ctx: ToolContext) -> Self {
        let system_prompt = prompts::chat_system_prompt(&registry.inventory());
        Self {
            engine: Engine::new(provider, registry, ctx, system_prompt),
        }
    }

    /// Send one user message, forwarding streamed chunks. Provider and
    /// network failures come back as actionable text rather than an
    /// error, so the conversation survives them.
    pub async fn send_message(
        &mut self,
        text: impl Into<String>,
        on_chunk: &mut (dyn FnMut(StreamChunk) + Send),
    ) -> String {
        match self.engine.chat_stream(text, on_chunk).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "chat turn failed");
                user_facing_message(&err)
            }
        }
    }

    /// Full turn history including the system prompt.
    pub fn history(&self) -> &[Message] {
        self.engine.history()
    }

    /// Clear the conversation, keeping the system prompt.
    pub fn reset(&mut self) {
        self.engine.reset();
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
