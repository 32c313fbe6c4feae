// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider-agnostic chat types and the [`Provider`] trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smith_core::CoreError;
use std::fmt;

/// Who authored a message turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    /// Result of a tool call, correlated by `tool_call_id`.
    Tool,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// One turn of conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Tool calls requested by an assistant turn; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    /// Correlates a `Tool` turn with the assistant's call id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// Tool schema forwarded to the provider's function-calling API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the accepted parameters.
    pub parameters: serde_json::Value,
}

/// A tool call selected by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned id, echoed back in the tool-result turn.
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Token accounting for one provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// One-shot chat result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Usage,
}

impl ChatResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Incremental piece of a streamed response. The final chunk carries
/// `done = true` and the usage totals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
    pub usage: Option<Usage>,
}

/// Callback receiving streamed chunks in order.
pub type ChunkSink<'a> = &'a mut (dyn FnMut(StreamChunk) + Send);

/// Abstract chat interface. Knows nothing of tasks or the store.
#[async_trait]
pub trait Provider: Send + Sync {
    /// One-shot chat completion.
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ChatResponse, CoreError>;

    /// Streamed completion. Implementations call `on_chunk` for each
    /// delta and finish with a `done` chunk; the returned response is
    /// the assembled whole.
    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_chunk: ChunkSink<'_>,
    ) -> Result<ChatResponse, CoreError>;

    /// Model identifiers this provider can serve.
    async fn list_models(&self) -> Result<Vec<String>, CoreError>;

    /// Short provider name (`"copilot"`, `"openrouter"`, ...).
    fn name(&self) -> &str;

    /// Whether credentials must be present before `chat` can succeed.
    fn requires_auth(&self) -> bool;
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
