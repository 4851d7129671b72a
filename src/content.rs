// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Guide asset schema and the content-loading seam.
//!
//! Assets form a three-level tree:
//!
//! ```text
//! root manifest ──▶ guide manifest ──▶ chapter content
//!   (guides)          (chapters)         (sections)
//! ```
//!
//! Older guide manifests name the chapter file under several different keys.
//! `ChapterEntry` resolves those once, at deserialization time, so nothing
//! past the loader boundary ever sees more than one shape.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// MANIFESTS
// =============================================================================

/// Top-level list of bundled guides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootManifest {
    #[serde(default)]
    pub guides: Vec<GuideEntry>,
}

impl RootManifest {
    pub fn guide_by_slug(&self, slug: &str) -> Option<&GuideEntry> {
        self.guides.iter().find(|g| g.slug == slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideEntry {
    pub slug: String,
    pub title: String,
    #[serde(alias = "manifest")]
    pub manifest_path: String,
}

/// Manifest of one guide: metadata plus ordered chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideManifest {
    pub guide: GuideInfo,
    #[serde(default)]
    pub chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideInfo {
    pub title: String,
    pub slug: Option<String>,
    pub version: Option<String>,
}

/// A chapter reference in canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChapterEntry")]
pub struct ChapterEntry {
    pub slug: String,
    pub title: String,
    /// Chapter file path relative to the guide directory.
    pub path: String,
}

impl ChapterEntry {
    pub fn new(slug: &str, title: &str, path: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            path: path.to_string(),
        }
    }
}

/// Chapter entry as written by any manifest generation, legacy keys included.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChapterEntry {
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    chapter_path: Option<String>,
    #[serde(default)]
    content_path: Option<String>,
    #[serde(default)]
    src: Option<String>,
}

impl TryFrom<RawChapterEntry> for ChapterEntry {
    type Error = String;

    fn try_from(raw: RawChapterEntry) -> std::result::Result<Self, Self::Error> {
        // Newest key first.
        let path = [raw.path, raw.chapter_path, raw.content_path, raw.file, raw.src]
            .into_iter()
            .flatten()
            .map(|p| p.trim().to_string())
            .find(|p| !p.is_empty())
            .ok_or_else(|| "chapter entry has no path".to_string())?;

        let slug = raw
            .slug
            .or(raw.id)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slug_from_path(&path));
        let title = raw.title.unwrap_or_else(|| slug.clone());

        Ok(ChapterEntry { slug, title, path })
    }
}

/// File stem of a chapter path, e.g. `"chapters/02-hta.json"` -> `"02-hta"`.
fn slug_from_path(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

// =============================================================================
// CHAPTER CONTENT
// =============================================================================

/// Parsed chapter: an ordered list of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterContent {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub sections: Vec<Section>,
}

/// One chapter section. Unknown `type` tags (workflows, graphs, ...) become
/// `Other` and are never searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Section {
    Text(TextSection),
    Table(TableSection),
    Image(ImageSection),
    #[serde(other)]
    Other,
}

impl Section {
    pub fn id(&self) -> Option<&str> {
        match self {
            Section::Text(s) => s.id.as_deref(),
            Section::Table(s) => s.id.as_deref(),
            Section::Image(s) => s.id.as_deref(),
            Section::Other => None,
        }
    }

    /// Lowercase variant name, used when synthesizing missing ids.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Section::Text(_) => "text",
            Section::Table(_) => "table",
            Section::Image(_) => "image",
            Section::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSection {
    pub id: Option<String>,
    pub heading: Option<String>,
    pub body: Option<String>,
    pub footnote: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSection {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Column headers. Displayed, not indexed.
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
    pub footnote: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRow {
    pub group: Option<String>,
    pub operator: Option<String>,
    #[serde(alias = "values")]
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSection {
    pub id: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub alt: Option<String>,
    pub src: Option<String>,
}

// =============================================================================
// LOADER SEAM
// =============================================================================

/// Content-loading collaborator consumed by the search core.
///
/// Implementations own the path space: the core only passes back strings it
/// got from manifests or from `guide_dir_from_manifest_path`.
pub trait ContentLoader: Send + Sync {
    fn load_root_manifest(&self) -> Result<RootManifest>;

    fn load_guide_manifest_by_path(&self, path: &str) -> Result<GuideManifest>;

    /// Directory handle of a guide, derived from its manifest path.
    fn guide_dir_from_manifest_path(&self, path: &str) -> String {
        guide_dir_of(path)
    }

    fn load_chapter_content(&self, guide_dir: &str, chapter_path: &str) -> Result<ChapterContent>;

    /// Non-failing variant used by whole-library search.
    fn try_load_chapter_content(
        &self,
        guide_dir: &str,
        chapter_path: &str,
    ) -> Option<ChapterContent> {
        match self.load_chapter_content(guide_dir, chapter_path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("skipping chapter {}: {}", join_asset_path(guide_dir, chapter_path), e);
                None
            }
        }
    }
}

/// Everything before the last `/` of a manifest path, or `""` if there is none.
pub fn guide_dir_of(manifest_path: &str) -> String {
    manifest_path
        .rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default()
}

/// Join a guide directory and a relative chapter path with `/`.
pub fn join_asset_path(guide_dir: &str, chapter_path: &str) -> String {
    let dir = guide_dir.trim_end_matches('/');
    let path = chapter_path.trim_start_matches('/');
    if dir.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", dir, path)
    }
}
