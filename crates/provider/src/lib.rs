// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! smith-provider: Abstract LLM provider interface.
//!
//! The core knows nothing about wire protocols. A [`Provider`] turns a
//! message history plus tool definitions into a response (one-shot or
//! streamed); credentials are loaded and saved here, opaque to callers.
//! Concrete providers (copilot, openrouter, ...) live outside the core
//! and implement this trait.

pub mod auth;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod scripted;

pub use auth::CredentialStore;
pub use types::{
    ChatResponse, ChunkSink, Message, MessageRole, Provider, StreamChunk, ToolCallRequest,
    ToolDefinition, Usage,
};

#[cfg(any(test, feature = "test-support"))]
pub use scripted::{ScriptedProvider, ScriptedReply};
