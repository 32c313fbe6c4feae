// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config file schema and field-wise layering.

use serde::{Deserialize, Serialize};
use smith_core::{CoreError, Role};
use smith_safety::AutoLevel;
use std::collections::BTreeMap;
use std::path::Path;

/// File name of a config document (both user and project level).
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Current schema version.
pub const CONFIG_VERSION: u32 = 1;

/// One config document as written on disk. Every field optional so a
/// project file can override just the model, say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_level: Option<AutoLevel>,
    /// Per-role model overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub agent_models: BTreeMap<Role, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Internal(format!("read {}: {}", path.display(), e)))?;
        serde_yaml::from_str(&text)
            .map_err(|e| CoreError::Internal(format!("parse {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Internal(format!("create {}: {}", parent.display(), e)))?;
        }
        let text = serde_yaml::to_string(self)
            .map_err(|e| CoreError::Internal(format!("encode config: {}", e)))?;
        std::fs::write(path, text)
            .map_err(|e| CoreError::Internal(format!("write {}: {}", path.display(), e)))
    }

    /// Overlay `other` on top of this document, field-wise.
    fn overlay(&mut self, other: ConfigFile) {
        if other.provider.is_some() {
            self.provider = other.provider;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.safety_level.is_some() {
            self.safety_level = other.safety_level;
        }
        for (role, model) in other.agent_models {
            self.agent_models.insert(role, model);
        }
        if other.version.is_some() {
            self.version = other.version;
        }
    }
}

/// Resolved configuration after layering, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub safety_level: AutoLevel,
    pub agent_models: BTreeMap<Role, String>,
    pub version: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            safety_level: AutoLevel::Medium,
            agent_models: BTreeMap::new(),
            version: CONFIG_VERSION,
        }
    }
}

impl Config {
    /// Layer user defaults under project overrides. Missing files are
    /// treated as empty documents.
    pub fn load_layered(user_dir: &Path, project_dir: &Path) -> Result<Self, CoreError> {
        let mut merged = ConfigFile::default();
        for dir in [user_dir, project_dir] {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                merged.overlay(ConfigFile::load(&path)?);
            }
        }
        Ok(Self::from_file(merged))
    }

    fn from_file(file: ConfigFile) -> Self {
        Self {
            provider: file.provider,
            model: file.model,
            safety_level: file.safety_level.unwrap_or_default(),
            agent_models: file.agent_models,
            version: file.version.unwrap_or(CONFIG_VERSION),
        }
    }

    /// Model to use for a role: the per-role override, else the global
    /// model.
    pub fn model_for(&self, role: Role) -> Option<&str> {
        self.agent_models
            .get(&role)
            .map(String::as_str)
            .or(self.model.as_deref())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
