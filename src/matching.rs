// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-chapter matching: find the query in every block and translate the
//! matches back to original-text coordinates.
//!
//! Matching is literal substring search over folded text. The query is one
//! contiguous phrase; folding already absorbed case and accent differences,
//! so the comparison itself is exact.
//!
//! # Steps per block
//!
//! 1. All non-overlapping occurrences, left to right, in normalized char
//!    coordinates.
//! 2. If that came back empty, one plain first-occurrence lookup.
//! 3. No occurrence, no hit.
//! 4. `[s, e]` becomes `[map[s], map[e]]` with both indices clamped into the
//!    map. Inverted results are dropped.
//! 5. A one-line preview centered on the first original range.
//! 6. One `SearchHit` per block with all of its ranges.

use crate::types::{ChapterIndex, MatchRange, NormalizedText, SearchHit, SearchQuery};

/// Ellipsis marker for truncated previews.
pub const ELLIPSIS: char = '…';

/// Every non-overlapping occurrence of `needle` in `haystack`, as inclusive
/// char ranges. An empty needle matches nothing.
pub fn find_all_occurrences(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    let needle_chars = needle.chars().count();
    let mut ranges = Vec::new();
    let mut chars_before = 0;
    let mut bytes_before = 0;

    for (byte_start, _) in haystack.match_indices(needle) {
        chars_before += haystack[bytes_before..byte_start].chars().count();
        bytes_before = byte_start;
        ranges.push((chars_before, chars_before + needle_chars - 1));
    }
    ranges
}

/// First occurrence of `needle` in `haystack` as an inclusive char range.
pub fn first_occurrence(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let byte_start = haystack.find(needle)?;
    let start = haystack[..byte_start].chars().count();
    Some((start, start + needle.chars().count() - 1))
}

/// Translate a normalized range into original coordinates.
pub fn map_to_original(text: &NormalizedText, (start, end): (usize, usize)) -> Option<MatchRange> {
    let start = text.original_offset(start)?;
    let end = text.original_offset(end)?;
    (start <= end).then(|| MatchRange::new(start, end))
}

/// One-line preview of `original` around `first`, with `context` chars on
/// each side and `…` where the text was cut.
pub fn build_preview(original: &str, first: MatchRange, context: usize) -> String {
    let chars: Vec<char> = original.chars().collect();
    let len = chars.len();
    let start = first.start.min(len).saturating_sub(context);
    let end = first.end.saturating_add(1).saturating_add(context).min(len);

    let snippet: String = chars[start..end.max(start)].iter().collect();
    let mut preview = String::with_capacity(snippet.len() + 8);
    if start > 0 {
        preview.push(ELLIPSIS);
    }
    preview.push_str(&snippet.split_whitespace().collect::<Vec<_>>().join(" "));
    if end < len {
        preview.push(ELLIPSIS);
    }
    preview
}

/// Match `query` against every block of `index` and build one hit per
/// matching block.
pub fn build_hits_for_chapter(
    index: &ChapterIndex,
    guide_slug: &str,
    query: &SearchQuery,
    preview_context: usize,
) -> Vec<SearchHit> {
    let needle = query.normalized.as_str();
    if needle.is_empty() {
        return Vec::new();
    }

    index
        .blocks
        .iter()
        .filter_map(|block| {
            let haystack = block.normalized.normalized.as_str();
            let mut found = find_all_occurrences(haystack, needle);
            if found.is_empty() {
                found.extend(first_occurrence(haystack, needle));
            }

            let ranges: Vec<MatchRange> = found
                .into_iter()
                .filter_map(|r| map_to_original(&block.normalized, r))
                .collect();
            let first = *ranges.first()?;

            Some(SearchHit {
                guide_slug: guide_slug.to_string(),
                chapter_slug: index.chapter_slug.clone(),
                chapter_path: index.chapter_path.clone(),
                section_id: block.section_id.clone(),
                section_type: block.section_type,
                preview: build_preview(&block.original_text, first, preview_context),
                match_ranges: ranges,
            })
        })
        .collect()
}
