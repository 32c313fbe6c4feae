// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! smith-safety: Shell-command and tool gating.
//!
//! Every `run_command` proposal from the LLM is checked here before a
//! subprocess is spawned. Evaluation order is fixed: hard blocks first
//! (never overridable), then the session allowlist, then the auto-level
//! tier. Rules come from a bundled YAML document that is copied to the
//! user config directory on first run; the user's copy wins.

pub mod policy;
pub mod rules;

pub use policy::{AutoLevel, Decision, SafetyPolicy};
pub use rules::{RulesDoc, RULES_FILE_NAME};
