// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker agent roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Specialization of a worker agent. Tasks carry a role and are only
/// claimed by agents of the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Planning,
    Implementation,
    Testing,
    Review,
}

impl Role {
    /// All roles, in the order agents are typically started.
    pub const ALL: [Role; 4] = [
        Role::Planning,
        Role::Implementation,
        Role::Testing,
        Role::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Planning => "planning",
            Role::Implementation => "implementation",
            Role::Testing => "testing",
            Role::Review => "review",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(Role::Planning),
            "implementation" => Ok(Role::Implementation),
            "testing" => Ok(Role::Testing),
            "review" => Ok(Role::Review),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
#[path = "role_tests.rs"]
mod tests;
