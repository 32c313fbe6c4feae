// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safety policy evaluation.
//!
//! Order matters and is fixed:
//! 1. hard blocks — regex patterns plus the command-substitution and
//!    pipe-to-shell detections; denied at every level,
//! 2. session allowlist — commands the user explicitly admitted,
//! 3. level check — low allows only its patterns, medium allows
//!    low ∪ medium, high allows anything not hard blocked.

use crate::rules::RulesDoc;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smith_core::CoreError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Safety tier governing what may run without confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AutoLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for AutoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoLevel::Low => write!(f, "low"),
            AutoLevel::Medium => write!(f, "medium"),
            AutoLevel::High => write!(f, "high"),
        }
    }
}

impl FromStr for AutoLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(AutoLevel::Low),
            "medium" => Ok(AutoLevel::Medium),
            "high" => Ok(AutoLevel::High),
            other => Err(format!("unknown safety level: {}", other)),
        }
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Allowed; carries the rule that matched ("session allowlist",
    /// "level high", or the winning pattern).
    Allowed { rule: String },
    Denied { reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Compiled policy plus the per-process session allowlist.
///
/// The allowlist lives only for the process lifetime: admitted commands
/// are forgotten on exit and must be re-admitted next run.
#[derive(Clone)]
pub struct SafetyPolicy {
    rules: RulesDoc,
    blocked: Arc<Vec<Regex>>,
    low_patterns: Arc<Vec<Regex>>,
    medium_patterns: Arc<Vec<Regex>>,
    session_allowlist: Arc<Mutex<HashSet<String>>>,
}

impl SafetyPolicy {
    pub fn new(rules: RulesDoc) -> Result<Self, CoreError> {
        let blocked = compile(&rules.blocked.patterns)?;
        let low_patterns = compile(&rules.levels.low.allow_patterns)?;
        let medium_patterns = compile(&rules.levels.medium.allow_patterns)?;
        Ok(Self {
            rules,
            blocked: Arc::new(blocked),
            low_patterns: Arc::new(low_patterns),
            medium_patterns: Arc::new(medium_patterns),
            session_allowlist: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Policy with the bundled rules, for tests and defaults.
    pub fn bundled() -> Result<Self, CoreError> {
        Self::new(RulesDoc::bundled()?)
    }

    /// Check a shell command at the given level.
    pub fn check_command(&self, command: &str, level: AutoLevel) -> Decision {
        let trimmed = command.trim();

        if let Some(reason) = self.hard_block_reason(trimmed) {
            return Decision::Denied { reason };
        }

        if self.rules.session_allowlist.enabled
            && self.session_allowlist.lock().contains(trimmed)
        {
            return Decision::Allowed {
                rule: "session allowlist".to_string(),
            };
        }

        match level {
            AutoLevel::High => Decision::Allowed {
                rule: "level high".to_string(),
            },
            AutoLevel::Medium => {
                match first_match(trimmed, &self.medium_patterns, &self.rules.levels.medium.allow_patterns)
                    .or_else(|| first_match(trimmed, &self.low_patterns, &self.rules.levels.low.allow_patterns))
                {
                    Some(rule) => Decision::Allowed { rule },
                    None => Decision::Denied {
                        reason: format!("command not allowed at level medium: {}", trimmed),
                    },
                }
            }
            AutoLevel::Low => {
                match first_match(trimmed, &self.low_patterns, &self.rules.levels.low.allow_patterns) {
                    Some(rule) => Decision::Allowed { rule },
                    None => Decision::Denied {
                        reason: format!("command not allowed at level low: {}", trimmed),
                    },
                }
            }
        }
    }

    /// Check a tool invocation. Low level restricts to the allow-tools
    /// list; medium and high permit every registered tool (mutating
    /// tools interpose a confirmation prompt instead).
    pub fn check_tool(&self, tool_name: &str, level: AutoLevel) -> Decision {
        match level {
            AutoLevel::Low => {
                if self
                    .rules
                    .levels
                    .low
                    .allow_tools
                    .iter()
                    .any(|t| t == tool_name)
                {
                    Decision::Allowed {
                        rule: "low allow-tools".to_string(),
                    }
                } else {
                    Decision::Denied {
                        reason: format!("tool not allowed at level low: {}", tool_name),
                    }
                }
            }
            AutoLevel::Medium | AutoLevel::High => Decision::Allowed {
                rule: format!("level {}", level),
            },
        }
    }

    /// Check and convert denial into `PolicyDenied`.
    pub fn enforce_command(&self, command: &str, level: AutoLevel) -> Result<String, CoreError> {
        match self.check_command(command, level) {
            Decision::Allowed { rule } => Ok(rule),
            Decision::Denied { reason } => {
                tracing::warn!(%command, %reason, "command denied");
                Err(CoreError::PolicyDenied(reason))
            }
        }
    }

    /// Admit a command for the rest of this process. Hard-blocked
    /// commands cannot be admitted.
    pub fn allow_for_session(&self, command: &str) -> Result<(), CoreError> {
        let trimmed = command.trim();
        if let Some(reason) = self.hard_block_reason(trimmed) {
            return Err(CoreError::PolicyDenied(reason));
        }
        if !self.rules.session_allowlist.enabled {
            return Err(CoreError::InvalidState(
                "session allowlist is disabled by the rules document".to_string(),
            ));
        }
        self.session_allowlist.lock().insert(trimmed.to_string());
        tracing::info!(command = %trimmed, "admitted to session allowlist");
        Ok(())
    }

    /// Commands currently admitted.
    pub fn session_allowlist(&self) -> Vec<String> {
        let mut entries: Vec<String> = self.session_allowlist.lock().iter().cloned().collect();
        entries.sort();
        entries
    }

    fn hard_block_reason(&self, command: &str) -> Option<String> {
        for (regex, source) in self.blocked.iter().zip(&self.rules.blocked.patterns) {
            if regex.is_match(command) {
                return Some(format!("matches blocked pattern: {}", source));
            }
        }
        for feature in &self.rules.blocked.features {
            match feature.as_str() {
                "command_substitution" => {
                    if command.contains("$(") || command.contains('`') {
                        return Some("command substitution".to_string());
                    }
                }
                "pipe_to_shell" => {
                    if pipes_to_shell(command) {
                        return Some("pipe to shell".to_string());
                    }
                }
                other => {
                    tracing::warn!(feature = other, "unknown blocked feature, ignoring");
                }
            }
        }
        None
    }
}

/// Detect `… | sh` style pipelines: any pipe segment whose command word
/// is a shell.
fn pipes_to_shell(command: &str) -> bool {
    command.split('|').skip(1).any(|segment| {
        matches!(
            segment.split_whitespace().next(),
            Some("sh" | "bash" | "zsh" | "dash")
        )
    })
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, CoreError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| CoreError::Internal(format!("bad safety pattern {}: {}", p, e)))
        })
        .collect()
}

fn first_match(command: &str, regexes: &[Regex], sources: &[String]) -> Option<String> {
    regexes
        .iter()
        .zip(sources)
        .find(|(regex, _)| regex.is_match(command))
        .map(|(_, source)| source.clone())
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
