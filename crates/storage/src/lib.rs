// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! smith-storage: Durable coordination state.
//!
//! A single-file embedded store (`.smith/smith.db`) holds every durable
//! record: tasks, sessions, file locks, agent presence, the append-only
//! event log, and token usage. All higher layers are stateless between
//! calls; the [`Coordinator`] facade is the sole mutator used by agents
//! and the UI.

pub mod bucket;
pub mod coordinator;
pub mod events;
pub mod locks;
pub mod registry;
pub mod sessions;
pub mod store;
pub mod tasks;

pub use bucket::{buckets, Txn};
pub use coordinator::{Coordinator, TaskStats};
pub use events::EventBus;
pub use locks::LockManager;
pub use registry::Registry;
pub use sessions::SessionStore;
pub use store::Store;
pub use tasks::TaskStore;
