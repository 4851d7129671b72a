// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The shared vocabulary of the search core.
//!
//! Two coordinate spaces exist and only one of them is allowed to leak:
//!
//! - **Normalized coordinates**: char offsets into the case/accent-folded
//!   haystack. They live inside the matcher and die there.
//! - **Original coordinates**: char offsets into the text as authored. Every
//!   `MatchRange` exposed by a `SearchHit` is in this space, because the UI
//!   paints highlights on the original text.
//!
//! All offsets are Unicode scalar (char) offsets, never byte offsets.
//!
//! # Invariants
//!
//! - **NormalizedText**: `map.len() == normalized.chars().count()` and every
//!   `map[i]` is a valid char offset into the source string.
//! - **SearchResult**: `total == hits.iter().map(SearchHit::matches_count).sum()`.
//! - **Block ids**: deterministic given the same section ordering, so
//!   re-opening a chapter reproduces identical `section_id`s.

use serde::{Deserialize, Serialize};

/// Case and accent sensitivity. The default folds both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFlags {
    pub case_sensitive: bool,
    pub accent_sensitive: bool,
}

impl SearchFlags {
    pub fn new(case_sensitive: bool, accent_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            accent_sensitive,
        }
    }
}

/// A folded string plus the map from each folded char back to its origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub normalized: String,
    /// `map[i]` is the original char offset that produced normalized char `i`.
    pub map: Vec<usize>,
}

impl NormalizedText {
    /// Length of the normalized text in chars (equal to `map.len()`).
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Original offset for a normalized offset, clamped into the map.
    ///
    /// Returns `None` only when the normalized text is empty.
    pub fn original_offset(&self, normalized_offset: usize) -> Option<usize> {
        let last = self.map.len().checked_sub(1)?;
        Some(self.map[normalized_offset.min(last)])
    }
}

/// Which kind of chapter section a block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SectionType {
    Text,
    Table,
    Image,
}

/// Smallest independently searchable fragment of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Full block identifier, e.g. `"sec-3#body"` or `"sec-3#r2c1"`.
    pub section_id: String,
    pub section_type: SectionType,
    pub original_text: String,
    pub normalized: NormalizedText,
}

/// Compiled, flag-specific index of one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterIndex {
    pub chapter_slug: String,
    pub chapter_path: String,
    pub blocks: Vec<Block>,
}

/// A query normalized with the same flags as the haystacks it runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub raw: String,
    pub normalized: String,
    pub flags: SearchFlags,
}

impl SearchQuery {
    /// Trim `raw` and normalize it under `flags`.
    pub fn new(raw: &str, flags: SearchFlags) -> Self {
        let raw = raw.trim().to_string();
        let normalized = crate::normalize::normalize_query(&raw, flags);
        Self {
            raw,
            normalized,
            flags,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Closed interval `[start, end]` of char offsets in original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

impl MatchRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of chars covered. Zero only for an inverted range.
    pub fn char_len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    /// The covered substring of `text`. Empty if the range is inverted or
    /// starts past the end of `text`; clipped if it ends past it.
    pub fn extract(&self, text: &str) -> String {
        text.chars().skip(self.start).take(self.char_len()).collect()
    }
}

/// A block with at least one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub guide_slug: String,
    pub chapter_slug: String,
    pub chapter_path: String,
    pub section_id: String,
    pub section_type: SectionType,
    pub match_ranges: Vec<MatchRange>,
    pub preview: String,
}

impl SearchHit {
    pub fn matches_count(&self) -> usize {
        self.match_ranges.len()
    }

    /// Whether this hit lives in the given chapter of the given guide.
    pub fn is_in_chapter(&self, guide_slug: &str, chapter_path: &str) -> bool {
        self.guide_slug == guide_slug && self.chapter_path == chapter_path
    }
}

/// Accumulated hits. `total` counts matches, not hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
    pub total: usize,
}

impl SearchResult {
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        let total = hits.iter().map(SearchHit::matches_count).sum();
        Self { hits, total }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Wire protocol between the indexer and its consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SearchIndexEvent {
    Progress { done: usize, total: usize },
    PartialResults { hits: Vec<SearchHit> },
    Done,
}

/// Progress as a fraction in `[0, 1]`; `None` when the total is unknown.
pub fn progress_fraction(done: usize, total: usize) -> Option<f32> {
    if total == 0 {
        None
    } else {
        Some((done.min(total) as f32) / (total as f32))
    }
}
