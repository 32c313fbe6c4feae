// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safety rules document.
//!
//! The bundled default ships inside the binary. On first run it is
//! copied to `~/.smith/rules.yaml` so users can customize; the on-disk
//! copy takes precedence over the bundle from then on.

use serde::{Deserialize, Serialize};
use smith_core::CoreError;
use std::path::{Path, PathBuf};

/// File name of the user rules copy under the config directory.
pub const RULES_FILE_NAME: &str = "rules.yaml";

const BUNDLED_RULES: &str = include_str!("../rules/default_rules.yaml");

/// Allow-rules for one auto level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LevelRules {
    #[serde(default)]
    pub allow_patterns: Vec<String>,
    #[serde(default)]
    pub allow_tools: Vec<String>,
}

/// The three tiers. `high` carries no patterns: everything not hard
/// blocked is allowed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Levels {
    #[serde(default)]
    pub low: LevelRules,
    #[serde(default)]
    pub medium: LevelRules,
    #[serde(default)]
    pub high: LevelRules,
}

/// Non-negotiable denials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Blocked {
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Named detections: `command_substitution`, `pipe_to_shell`.
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionAllowlistConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// The whole rules document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RulesDoc {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub levels: Levels,
    #[serde(default)]
    pub blocked: Blocked,
    #[serde(default)]
    pub session_allowlist: SessionAllowlistConfig,
}

impl RulesDoc {
    /// The document compiled into the binary.
    pub fn bundled() -> Result<Self, CoreError> {
        parse(BUNDLED_RULES)
    }

    /// Load rules for the given config dir, copying the bundle there on
    /// first run. A pre-existing user copy wins over the bundle.
    pub fn load_or_init(config_dir: &Path) -> Result<Self, CoreError> {
        let path = config_dir.join(RULES_FILE_NAME);
        if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                CoreError::Internal(format!("read {}: {}", path.display(), e))
            })?;
            return parse(&text);
        }
        std::fs::create_dir_all(config_dir)
            .map_err(|e| CoreError::Internal(format!("create {}: {}", config_dir.display(), e)))?;
        std::fs::write(&path, BUNDLED_RULES)
            .map_err(|e| CoreError::Internal(format!("write {}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "installed default safety rules");
        parse(BUNDLED_RULES)
    }

    /// Default location of the user rules copy.
    pub fn user_rules_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".smith").join(RULES_FILE_NAME))
    }
}

fn parse(text: &str) -> Result<RulesDoc, CoreError> {
    serde_yaml::from_str(text)
        .map_err(|e| CoreError::Internal(format!("parse safety rules: {}", e)))
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
