// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted provider for deterministic testing.
//!
//! Replies are queued up front and served in order; every request is
//! recorded for assertions. Errors can be injected to exercise the
//! engine's failure paths.
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::types::{
    ChatResponse, ChunkSink, Message, Provider, StreamChunk, ToolCallRequest, ToolDefinition,
    Usage,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use smith_core::CoreError;
use std::collections::VecDeque;
use std::sync::Arc;

/// One canned reply.
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Usage,
}

impl ScriptedReply {
    /// A plain text reply with token counts.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        }
    }

    /// A reply that calls one tool.
    pub fn tool_call(
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        let name = name.into();
        Self {
            content: String::new(),
            tool_calls: vec![ToolCallRequest {
                id: format!("call-{}", name),
                name,
                arguments,
            }],
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        }
    }

    pub fn with_usage(mut self, prompt: u64, completion: u64) -> Self {
        self.usage = Usage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
        };
        self
    }
}

/// A recorded request: the message history and tool names offered.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
}

struct ScriptedState {
    replies: VecDeque<Result<ScriptedReply, String>>,
    requests: Vec<RecordedRequest>,
}

/// Deterministic [`Provider`] for tests.
#[derive(Clone)]
pub struct ScriptedProvider {
    state: Arc<Mutex<ScriptedState>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptedState {
                replies: VecDeque::new(),
                requests: Vec::new(),
            })),
        }
    }

    /// Queue a reply to serve on the next chat call.
    pub fn push_reply(&self, reply: ScriptedReply) {
        self.state.lock().replies.push_back(Ok(reply));
    }

    /// Queue a network-style failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.state.lock().replies.push_back(Err(message.into()));
    }

    /// Everything sent to this provider so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    fn next_reply(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ScriptedReply, CoreError> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });
        match state.replies.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(CoreError::Network(message)),
            None => Err(CoreError::ProviderUnavailable(
                "scripted provider ran out of replies".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ChatResponse, CoreError> {
        let reply = self.next_reply(messages, tools)?;
        Ok(ChatResponse {
            content: reply.content,
            tool_calls: reply.tool_calls,
            usage: reply.usage,
        })
    }

    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_chunk: ChunkSink<'_>,
    ) -> Result<ChatResponse, CoreError> {
        let reply = self.next_reply(messages, tools)?;
        // Stream the content in two pieces to exercise reassembly.
        let mut split = reply.content.len() / 2;
        while !reply.content.is_char_boundary(split) {
            split -= 1;
        }
        let (head, tail) = reply.content.split_at(split);
        if !head.is_empty() {
            on_chunk(StreamChunk {
                content: head.to_string(),
                done: false,
                usage: None,
            });
        }
        on_chunk(StreamChunk {
            content: tail.to_string(),
            done: true,
            usage: Some(reply.usage),
        });
        Ok(ChatResponse {
            content: reply.content,
            tool_calls: reply.tool_calls,
            usage: reply.usage,
        })
    }

    async fn list_models(&self) -> Result<Vec<String>, CoreError> {
        Ok(vec!["scripted-1".to_string()])
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn requires_auth(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod tests;
