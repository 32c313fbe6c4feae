// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible rendering of core errors.
//!
//! Provider and network failures that surface in the chat carry an
//! actionable hint instead of a bare error string.

use smith_core::CoreError;

/// Render an error for the chat window, with a next step where one
/// exists.
pub fn user_facing_message(err: &CoreError) -> String {
    match err {
        CoreError::AuthRequired(provider) => format!(
            "Not signed in to {}. Run the provider login from settings, then retry.",
            provider
        ),
        CoreError::AuthFailed(detail) => format!(
            "Authentication failed ({}). Refresh your credentials in settings and retry.",
            detail
        ),
        CoreError::RateLimited => {
            "The provider is rate limiting us. Wait a moment and retry.".to_string()
        }
        CoreError::ProviderUnavailable(detail) => format!(
            "The provider is unavailable ({}). Check its status page or switch models in settings.",
            detail
        ),
        CoreError::Network(detail) => format!(
            "Network error ({}). Check your connection and retry.",
            detail
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
