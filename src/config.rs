// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Tunables for the indexer and the search session.

use serde::{Deserialize, Serialize};

/// Default number of compiled chapter indices kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

/// Characters of context kept on each side of the first match in a preview.
pub const DEFAULT_PREVIEW_CONTEXT: usize = 48;

/// Maximum number of remembered queries.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Search configuration.
///
/// Every field is optional when deserialized; missing fields take the
/// defaults above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Maximum entries in the chapter index cache. Values below 1 are raised to 1.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default = "default_preview_context")]
    pub preview_context: usize,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_preview_context() -> usize {
    DEFAULT_PREVIEW_CONTEXT
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            preview_context: DEFAULT_PREVIEW_CONTEXT,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl SearchConfig {
    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
