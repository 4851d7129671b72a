// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Case and accent folding that remembers where every char came from.
//!
//! A plain `nfd().filter().to_lowercase()` pipeline is fine for building a
//! searchable string, but it forgets positions. Highlights have to be painted
//! on the original text, so here each original char is folded on its own and
//! every char it produces records the original offset.
//!
//! # Algorithm
//!
//! For each original char at char offset `i`:
//!
//! 1. Unless accent sensitive: canonical decomposition (NFD of that char),
//!    dropping combining marks. `É` becomes `E`.
//! 2. Unless case sensitive: lowercase each remaining char. `E` becomes `e`,
//!    `İ` becomes `i` + U+0307.
//! 3. Push every produced char with `map` entry `i`.
//!
//! One original char may therefore yield zero chars (a stray combining mark),
//! one char, or several chars sharing the same `map` value.

use unicode_normalization::char::{decompose_canonical, is_combining_mark};

use crate::types::{NormalizedText, SearchFlags};

/// Fold `text` under `flags`, keeping the map back to original char offsets.
///
/// Pure function of `(text, flags)`.
///
/// ```
/// use guide_search::{normalize_for_search, SearchFlags};
///
/// let folded = normalize_for_search("CAFÉ", SearchFlags::default());
/// assert_eq!(folded.normalized, "cafe");
/// assert_eq!(folded.map, vec![0, 1, 2, 3]);
/// ```
pub fn normalize_for_search(text: &str, flags: SearchFlags) -> NormalizedText {
    let mut normalized = String::with_capacity(text.len());
    let mut map = Vec::with_capacity(text.len());
    let mut folded: Vec<char> = Vec::with_capacity(4);

    for (offset, c) in text.chars().enumerate() {
        folded.clear();
        if flags.accent_sensitive {
            folded.push(c);
        } else {
            decompose_canonical(c, |d| {
                if !is_combining_mark(d) {
                    folded.push(d);
                }
            });
        }

        for &f in &folded {
            if flags.case_sensitive {
                normalized.push(f);
                map.push(offset);
            } else {
                for lower in f.to_lowercase() {
                    normalized.push(lower);
                    map.push(offset);
                }
            }
        }
    }

    NormalizedText { normalized, map }
}

/// Fold a query string. Same folding as the haystacks, map discarded.
pub fn normalize_query(query: &str, flags: SearchFlags) -> String {
    normalize_for_search(query, flags).normalized
}
