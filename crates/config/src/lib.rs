// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! smith-config: Layered configuration and project bootstrap.
//!
//! Two YAML documents: `~/.smith/config.yaml` holds user defaults,
//! `<project>/.smith/config.yaml` holds per-project overrides. The
//! project file wins field-wise. `init_project_dir` creates the
//! `.smith/` directory with a generated `.gitignore` so the store file
//! never lands in version control.

pub mod file;
pub mod project;

pub use file::{Config, ConfigFile, CONFIG_FILE_NAME, CONFIG_VERSION};
pub use project::{init_project_dir, smith_dir, store_path};
