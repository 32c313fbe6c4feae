// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider credential storage.
//!
//! Credentials live in `~/.smith/auth.yaml`, keyed by provider name,
//! written with mode 0600. Their contents are opaque to the core; a
//! provider owns refresh and interpretation.

use serde::{Deserialize, Serialize};
use smith_core::CoreError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the credentials document under the config directory.
pub const AUTH_FILE_NAME: &str = "auth.yaml";

/// Opaque credential blob for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
    /// Provider-specific extras.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
struct AuthDoc {
    #[serde(default)]
    providers: BTreeMap<String, Credentials>,
}

/// Load/save interface over the credentials file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's `~/.smith` directory.
    pub fn user_default() -> Result<Self, CoreError> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Internal("cannot determine home directory".to_string()))?;
        Ok(Self::new(home.join(".smith").join(AUTH_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Credentials for `provider`, if any are saved.
    pub fn load(&self, provider: &str) -> Result<Option<Credentials>, CoreError> {
        Ok(self.read_doc()?.providers.remove(provider))
    }

    /// Save credentials for `provider`, creating the file with owner-only
    /// permissions.
    pub fn save(&self, provider: &str, credentials: Credentials) -> Result<(), CoreError> {
        let mut doc = self.read_doc()?;
        doc.providers.insert(provider.to_string(), credentials);
        self.write_doc(&doc)
    }

    /// Drop saved credentials for `provider`. Returns whether any existed.
    pub fn clear(&self, provider: &str) -> Result<bool, CoreError> {
        let mut doc = self.read_doc()?;
        let existed = doc.providers.remove(provider).is_some();
        if existed {
            self.write_doc(&doc)?;
        }
        Ok(existed)
    }

    fn read_doc(&self) -> Result<AuthDoc, CoreError> {
        if !self.path.exists() {
            return Ok(AuthDoc::default());
        }
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| CoreError::Internal(format!("read {}: {}", self.path.display(), e)))?;
        serde_yaml::from_str(&text)
            .map_err(|e| CoreError::AuthFailed(format!("malformed credentials file: {}", e)))
    }

    fn write_doc(&self, doc: &AuthDoc) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Internal(format!("create {}: {}", parent.display(), e)))?;
        }
        let text = serde_yaml::to_string(doc)
            .map_err(|e| CoreError::Internal(format!("encode credentials: {}", e)))?;
        std::fs::write(&self.path, text)
            .map_err(|e| CoreError::Internal(format!("write {}: {}", self.path.display(), e)))?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| CoreError::Internal(format!("chmod {}: {}", path.display(), e)))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
