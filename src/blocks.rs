// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Flatten a chapter's section tree into independently searchable blocks.
//!
//! Every block gets an identifier `"{sectionId}#{suffix}"`:
//!
//! | Section | Field                | Suffix         |
//! |---------|----------------------|----------------|
//! | text    | body                 | `#body`        |
//! | text    | footnote             | `#footnote`    |
//! | table   | title                | `#title`       |
//! | table   | row `r` group label  | `#r{r}group`   |
//! | table   | row `r` operator     | `#r{r}op`      |
//! | table   | row `r` cell `c`     | `#r{r}c{c}`    |
//! | table   | footnote             | `#footnote`    |
//! | image   | title + caption + alt| `#caption`     |
//!
//! Text headings and table column headers are not indexed. Sections without
//! an id get `s{position}-{variant}`. If an authored id in the same chapter
//! already reads that way, `-{n}` is appended with the smallest `n` that is
//! free. Synthetic ids are unique within the chapter and stable as long as the
//! sections are.

use std::collections::HashSet;

use crate::content::{ChapterContent, ImageSection, Section, TableSection, TextSection};
use crate::normalize::normalize_for_search;
use crate::types::{Block, SearchFlags, SectionType};

/// Extract all searchable blocks of `chapter`, normalized under `flags`.
pub fn extract_blocks(chapter: &ChapterContent, flags: SearchFlags) -> Vec<Block> {
    let mut out = BlockSink {
        blocks: Vec::new(),
        flags,
    };

    let mut taken: HashSet<String> = chapter
        .sections
        .iter()
        .filter_map(authored_id)
        .map(str::to_string)
        .collect();

    for (position, section) in chapter.sections.iter().enumerate() {
        let section_id = match authored_id(section) {
            Some(id) => id.to_string(),
            None => synthetic_section_id(position, section, &mut taken),
        };

        match section {
            Section::Text(text) => out.text(&section_id, text),
            Section::Table(table) => out.table(&section_id, table),
            Section::Image(image) => out.image(&section_id, image),
            Section::Other => {}
        }
    }

    out.blocks
}

fn authored_id(section: &Section) -> Option<&str> {
    section.id().map(str::trim).filter(|id| !id.is_empty())
}

/// Id for a section that does not carry one, avoiding every id in `taken`.
///
/// The returned id is added to `taken`.
pub fn synthetic_section_id(
    position: usize,
    section: &Section,
    taken: &mut HashSet<String>,
) -> String {
    let base = format!("s{}-{}", position, section.variant_name());
    let mut id = base.clone();
    let mut n = 1;
    while taken.contains(&id) {
        id = format!("{}-{}", base, n);
        n += 1;
    }
    taken.insert(id.clone());
    id
}

struct BlockSink {
    blocks: Vec<Block>,
    flags: SearchFlags,
}

impl BlockSink {
    /// Push a block if `text` is non-blank after trimming.
    fn push(
        &mut self,
        section_id: &str,
        suffix: &str,
        section_type: SectionType,
        text: Option<&str>,
    ) {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return;
        };
        self.blocks.push(Block {
            section_id: format!("{}#{}", section_id, suffix),
            section_type,
            original_text: text.to_string(),
            normalized: normalize_for_search(text, self.flags),
        });
    }

    fn text(&mut self, id: &str, section: &TextSection) {
        self.push(id, "body", SectionType::Text, section.body.as_deref());
        self.push(id, "footnote", SectionType::Text, section.footnote.as_deref());
    }

    fn table(&mut self, id: &str, section: &TableSection) {
        self.push(id, "title", SectionType::Table, section.title.as_deref());
        for (r, row) in section.rows.iter().enumerate() {
            self.push(id, &format!("r{}group", r), SectionType::Table, row.group.as_deref());
            self.push(id, &format!("r{}op", r), SectionType::Table, row.operator.as_deref());
            for (c, cell) in row.cells.iter().enumerate() {
                self.push(id, &format!("r{}c{}", r, c), SectionType::Table, Some(cell));
            }
        }
        self.push(id, "footnote", SectionType::Table, section.footnote.as_deref());
    }

    fn image(&mut self, id: &str, section: &ImageSection) {
        let caption = [&section.title, &section.caption, &section.alt]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        self.push(id, "caption", SectionType::Image, Some(&caption));
    }
}
