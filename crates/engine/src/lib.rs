// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! smith-engine: Conversational driver, worker agents, chat session.
//!
//! The [`Engine`] turns a message plus history into provider calls and
//! tool executions until the model produces a final text. An [`Agent`]
//! wraps an engine in the claim → execute → publish worker loop; the
//! [`ChatSession`] wraps one for the foreground user conversation.

pub mod agent;
#[cfg(test)]
pub(crate) mod test_support;
pub mod chat;
pub mod engine;
pub mod error;
pub mod prompts;

pub use agent::{Agent, AgentHandle, STAGGER_MS};
pub use chat::ChatSession;
pub use engine::{Engine, RoleConsultant, MAX_TOOL_TURNS};
pub use error::user_facing_message;
