// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Filesystem content loader.
//!
//! Reads the guide asset tree from a directory on disk. The layout mirrors
//! the bundled assets:
//!
//! ```text
//! <root>/manifest.json                      root manifest
//! <root>/guides/<slug>/manifest.json        guide manifest
//! <root>/guides/<slug>/<chapter path>       chapter content
//! ```
//!
//! Paths in manifests are always `/`-separated and relative to `<root>`.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;

use crate::content::{join_asset_path, ChapterContent, ContentLoader, GuideManifest, RootManifest};
use crate::error::{Result, SearchError};

/// Path of the root manifest inside an asset tree.
pub const ROOT_MANIFEST_PATH: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct FsContentLoader {
    root: PathBuf,
}

impl FsContentLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, asset_path: &str) -> PathBuf {
        asset_path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    fn read_json<T: DeserializeOwned>(&self, asset_path: &str) -> Result<T> {
        let path = self.resolve(asset_path);
        debug!("loading {}", path.display());
        let content = fs::read_to_string(&path).map_err(|e| SearchError::from_io(asset_path, e))?;
        serde_json::from_str(&content).map_err(|e| SearchError::parse(asset_path, e))
    }
}

impl ContentLoader for FsContentLoader {
    fn load_root_manifest(&self) -> Result<RootManifest> {
        self.read_json(ROOT_MANIFEST_PATH)
    }

    fn load_guide_manifest_by_path(&self, path: &str) -> Result<GuideManifest> {
        self.read_json(path)
    }

    fn load_chapter_content(&self, guide_dir: &str, chapter_path: &str) -> Result<ChapterContent> {
        self.read_json(&join_asset_path(guide_dir, chapter_path))
    }
}
