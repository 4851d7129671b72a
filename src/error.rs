// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the search core.
//!
//! Only load failures are ever surfaced. Matching and coordinate-mapping
//! edge cases are dropped block by block inside the matcher and never reach
//! this type.

use std::io;

use thiserror::Error;

/// Errors raised while loading guide assets or running a targeted search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The requested asset does not exist in the content store.
    #[error("asset not found: {path}")]
    NotFound { path: String },

    /// The asset exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The asset was read but is not valid JSON for the expected schema.
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// No guide in the root manifest matches the given slug or directory.
    #[error("guide not found: {0}")]
    GuideNotFound(String),

    /// The search worker thread died before reporting a result.
    #[error("search worker failed: {0}")]
    Worker(String),
}

impl SearchError {
    /// Build the error for a failed read, mapping `NotFound` to its own variant.
    pub fn from_io(path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            SearchError::NotFound { path }
        } else {
            SearchError::Io { path, source }
        }
    }

    pub fn parse(path: impl Into<String>, source: serde_json::Error) -> Self {
        SearchError::Parse {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
