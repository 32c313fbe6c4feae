// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool registry: name → implementation, plus the definition list
//! forwarded to the provider.

use crate::fs_tools;
use crate::search_tools;
use crate::shell_tool;
use crate::task_tools;
use crate::tool::Tool;
use smith_provider::ToolDefinition;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the full built-in tool set.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        for tool in fs_tools::all() {
            registry.register(tool);
        }
        for tool in search_tools::all() {
            registry.register(tool);
        }
        registry.register(Arc::new(shell_tool::RunCommand));
        for tool in task_tools::all() {
            registry.register(tool);
        }
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions in provider shape, name-ordered.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// One line per tool, for role system prompts.
    pub fn inventory(&self) -> String {
        self.tools
            .values()
            .map(|tool| format!("- {}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
