// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display utilities for the guide-search CLI.
//!
//! OneDark colors on dark terminals, One Light on light ones. Detection tries
//! `GUIDE_SEARCH_THEME` first, then `COLORFGBG`, then defaults to dark.
//! `NO_COLOR` and non-TTY output turn styling off entirely, and matches are
//! then left unmarked.

use std::sync::OnceLock;

use guide_search::matching::{find_all_occurrences, map_to_original};
use guide_search::{normalize_for_search, MatchRange, SearchHit, SearchQuery, SectionType};

// ═══════════════════════════════════════════════════════════════════════════
// THEME DETECTION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("GUIDE_SEARCH_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg", where a background of 7 or more (except 8) is light.
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        if let Some(Ok(bg)) = colorfgbg.split(';').next_back().map(str::parse::<u8>) {
            if bg >= 7 && bg != 8 {
                return Theme::Light;
            }
        }
    }

    Theme::Dark
}

pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

// ═══════════════════════════════════════════════════════════════════════════
// PALETTES
// ═══════════════════════════════════════════════════════════════════════════

fn rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

mod onedark {
    pub const RED: (u8, u8, u8) = (224, 108, 117); // #e06c75
    pub const GREEN: (u8, u8, u8) = (152, 195, 121); // #98c379
    pub const BLUE: (u8, u8, u8) = (97, 175, 239); // #61afef
    pub const MAGENTA: (u8, u8, u8) = (198, 120, 221); // #c678dd
    pub const CYAN: (u8, u8, u8) = (86, 182, 194); // #56b6c2
    pub const GRAY: (u8, u8, u8) = (92, 99, 112); // #5c6370
    pub const BRIGHT_YELLOW: (u8, u8, u8) = (255, 215, 0);
}

mod onelight {
    pub const RED: (u8, u8, u8) = (228, 86, 73); // #e45649
    pub const GREEN: (u8, u8, u8) = (80, 161, 79); // #50a14f
    pub const BLUE: (u8, u8, u8) = (64, 120, 242); // #4078f2
    pub const MAGENTA: (u8, u8, u8) = (166, 38, 164); // #a626a4
    pub const CYAN: (u8, u8, u8) = (1, 132, 188); // #0184bc
    pub const GRAY: (u8, u8, u8) = (160, 161, 167); // #a0a1a7
    pub const BRIGHT_YELLOW: (u8, u8, u8) = (152, 104, 1);
}

macro_rules! theme_color {
    ($name:ident) => {
        #[allow(non_snake_case)]
        pub fn $name() -> String {
            rgb(match theme() {
                Theme::Dark => onedark::$name,
                Theme::Light => onelight::$name,
            })
        }
    };
}

theme_color!(RED);
theme_color!(GREEN);
theme_color!(BLUE);
theme_color!(MAGENTA);
theme_color!(CYAN);
theme_color!(GRAY);
theme_color!(BRIGHT_YELLOW);

// ═══════════════════════════════════════════════════════════════════════════
// CORE UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Check if colors should be used (TTY detection)
pub fn use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// Apply theme color with optional modifiers
pub fn themed(color_fn: fn() -> String, modifiers: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}{}", modifiers.join(""), color_fn(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Calculate visible length (excluding ANSI codes)
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape && c == 'm' {
            in_escape = false;
        } else if !in_escape {
            len += 1;
        }
    }
    len
}

/// Right-pad a styled string to a fixed visible width
pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SEMANTIC FORMATTERS
// ═══════════════════════════════════════════════════════════════════════════

/// Color-coded section type badge
pub fn section_badge(section_type: SectionType) -> String {
    let (label, color): (&str, fn() -> String) = match section_type {
        SectionType::Text => ("TEXT", GREEN),
        SectionType::Table => ("TABLE", BLUE),
        SectionType::Image => ("IMAGE", MAGENTA),
    };
    themed(color, &[], &format!("[{}]", label))
}

/// `guide › chapter  section [TYPE]  (n matches)`
pub fn hit_header(hit: &SearchHit) -> String {
    let matches = match hit.matches_count() {
        1 => "1 match".to_string(),
        n => format!("{} matches", n),
    };
    format!(
        "{} › {}  {} {}  {}",
        themed(CYAN, &[BOLD], &hit.guide_slug),
        themed(CYAN, &[], &hit.chapter_slug),
        themed(GRAY, &[], &hit.section_id),
        section_badge(hit.section_type),
        themed(GRAY, &[], &format!("({})", matches)),
    )
}

/// Ranges of `query` inside `text`, matched the same way the index matches.
pub fn match_ranges_in(text: &str, query: &SearchQuery) -> Vec<MatchRange> {
    let folded = normalize_for_search(text, query.flags);
    find_all_occurrences(&folded.normalized, &query.normalized)
        .into_iter()
        .filter_map(|range| map_to_original(&folded, range))
        .collect()
}

/// Wrap every range of `text` in `open`/`close` markers.
pub fn mark_ranges(text: &str, ranges: &[MatchRange], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len() + ranges.len() * (open.len() + close.len()));
    let mut ranges = ranges.iter().peekable();
    for (i, c) in text.chars().enumerate() {
        if ranges.peek().is_some_and(|r| r.start == i) {
            out.push_str(open);
        }
        out.push(c);
        if let Some(r) = ranges.peek() {
            if r.end == i {
                out.push_str(close);
                ranges.next();
            }
        }
    }
    out
}

/// Preview with every occurrence of the query highlighted.
pub fn highlight_preview(preview: &str, query: &SearchQuery) -> String {
    if !use_colors() {
        return preview.to_string();
    }
    let open = format!("{}{}", BOLD, BRIGHT_YELLOW());
    mark_ranges(preview, &match_ranges_in(preview, query), &open, RESET)
}

/// Final summary line
pub fn summary(hits: usize, matches: usize, query: &str) -> String {
    if hits == 0 {
        return themed(RED, &[], &format!("No results for \"{}\"", query));
    }
    format!(
        "{} in {} for \"{}\"",
        themed(GREEN, &[BOLD], &format!("{} matches", matches)),
        themed(GREEN, &[], &format!("{} blocks", hits)),
        query
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
