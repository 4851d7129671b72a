// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Recent queries, most recent first.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HISTORY_LIMIT;

/// Bounded, case-insensitively deduplicated query history.
///
/// Remembering a query that is already present (ignoring case) moves the
/// existing entry to the front. The stored spelling is the one that was
/// remembered first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentQueries {
    items: Vec<String>,
    limit: usize,
}

impl RecentQueries {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a query. Blank queries are ignored.
    pub fn remember(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let key = query.to_lowercase();
        let entry = match self.items.iter().position(|item| item.to_lowercase() == key) {
            Some(pos) => self.items.remove(pos),
            None => query.to_string(),
        };
        self.items.insert(0, entry);
        self.items.truncate(self.limit);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for RecentQueries {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
