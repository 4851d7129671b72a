//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides an in-memory content store and a small two-guide library
//! so every test talks about the same fixture.

#![doc(hidden)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::content::{
    join_asset_path, ChapterContent, ContentLoader, GuideManifest, RootManifest,
};
use crate::error::{Result, SearchError};
use crate::loader::ROOT_MANIFEST_PATH;
use crate::types::{MatchRange, SearchHit, SectionType};

/// Content store backed by a map of asset path to raw JSON.
///
/// Assets are parsed on every load, so a malformed entry fails exactly like
/// a malformed file would.
#[derive(Default)]
pub struct MemoryContentLoader {
    assets: RwLock<HashMap<String, String>>,
    chapter_loads: AtomicUsize,
}

impl MemoryContentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(self, path: &str, json: impl Into<String>) -> Self {
        self.insert(path, json);
        self
    }

    pub fn insert(&self, path: &str, json: impl Into<String>) {
        self.assets.write().insert(path.to_string(), json.into());
    }

    pub fn remove(&self, path: &str) {
        self.assets.write().remove(path);
    }

    /// Number of `load_chapter_content` calls so far (cache misses).
    pub fn chapter_loads(&self) -> usize {
        self.chapter_loads.load(Ordering::Relaxed)
    }

    fn read<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let assets = self.assets.read();
        let raw = assets.get(path).ok_or_else(|| SearchError::NotFound {
            path: path.to_string(),
        })?;
        serde_json::from_str(raw).map_err(|e| SearchError::parse(path, e))
    }
}

impl ContentLoader for MemoryContentLoader {
    fn load_root_manifest(&self) -> Result<RootManifest> {
        self.read(ROOT_MANIFEST_PATH)
    }

    fn load_guide_manifest_by_path(&self, path: &str) -> Result<GuideManifest> {
        self.read(path)
    }

    fn load_chapter_content(&self, guide_dir: &str, chapter_path: &str) -> Result<ChapterContent> {
        self.chapter_loads.fetch_add(1, Ordering::Relaxed);
        self.read(&join_asset_path(guide_dir, chapter_path))
    }
}

/// Body text of the hypertension diagnosis chapter.
pub const HTA_DIAGNOSIS_BODY: &str =
    "El diagnóstico de la HIPERTENSIÓN arterial requiere al menos dos tomas en consulta.";

/// Body text of the hypertension treatment chapter.
pub const HTA_TREATMENT_BODY: &str =
    "El manejo de la HIPERTENSIÓN arterial combina dieta y fármacos. \
     La hipertensión resistente requiere tres fármacos.";

/// Two guides, five chapters.
///
/// | Guide | Chapter       | Mentions of "hipertension" |
/// |-------|---------------|----------------------------|
/// | hta   | diagnostico   | 1 (body)                   |
/// | hta   | tratamiento   | 2 (body)                   |
/// | hta   | seguimiento   | 0                          |
/// | dm2   | cribado       | 1 (body)                   |
/// | dm2   | farmacos      | 0                          |
///
/// The hta manifest uses three different legacy keys for chapter paths.
/// Pairs are asset path and raw JSON.
pub fn sample_assets() -> Vec<(&'static str, String)> {
    vec![
        (
            ROOT_MANIFEST_PATH,
            json!({"guides": [
                {
                    "slug": "hta",
                    "title": "Hipertensión arterial",
                    "manifestPath": "guides/hta/manifest.json"
                },
                {
                    "slug": "dm2",
                    "title": "Diabetes mellitus tipo 2",
                    "manifestPath": "guides/dm2/manifest.json"
                }
            ]})
            .to_string(),
        ),
        (
            "guides/hta/manifest.json",
            json!({
                "guide": {"title": "Hipertensión arterial", "version": "2024"},
                "chapters": [
                    {
                        "slug": "diagnostico",
                        "title": "Diagnóstico",
                        "path": "chapters/01-diagnostico.json"
                    },
                    {
                        "slug": "tratamiento",
                        "title": "Tratamiento",
                        "file": "chapters/02-tratamiento.json"
                    },
                    {
                        "slug": "seguimiento",
                        "title": "Seguimiento",
                        "chapterPath": "chapters/03-seguimiento.json"
                    }
                ]
            })
            .to_string(),
        ),
        (
            "guides/hta/chapters/01-diagnostico.json",
            json!({"sections": [
                {
                    "type": "text",
                    "id": "sec-1",
                    "heading": "Hipertensión",
                    "body": HTA_DIAGNOSIS_BODY,
                    "footnote": "Ver tabla de presión."
                },
                {
                    "type": "image",
                    "id": "fig-1",
                    "title": "Algoritmo de diagnóstico",
                    "src": "img/algo.png"
                }
            ]})
            .to_string(),
        ),
        (
            "guides/hta/chapters/02-tratamiento.json",
            json!({"sections": [
                {"type": "text", "id": "sec-1", "body": HTA_TREATMENT_BODY},
                {"type": "table", "id": "tab-1", "title": "Fármacos de primera línea",
                 "columns": ["Fármaco", "Dosis"],
                 "rows": [
                    {"group": "IECA", "cells": ["Enalapril", "10-40 mg"]},
                    {"group": "ARA-II", "operator": "o", "cells": ["Losartán", "50-100 mg"]}
                 ],
                 "footnote": "Evitar en embarazo."},
                {"type": "workflow", "id": "wf-1", "nodes": []}
            ]})
            .to_string(),
        ),
        (
            "guides/hta/chapters/03-seguimiento.json",
            json!({"sections": [
                {"type": "text", "body": "Control anual del paciente con analítica básica."}
            ]})
            .to_string(),
        ),
        (
            "guides/dm2/manifest.json",
            json!({
                "guide": {"title": "Diabetes mellitus tipo 2"},
                "chapters": [
                    {"slug": "cribado", "title": "Cribado", "path": "chapters/cribado.json"},
                    {"slug": "farmacos", "title": "Fármacos", "path": "chapters/farmacos.json"}
                ]
            })
            .to_string(),
        ),
        (
            "guides/dm2/chapters/cribado.json",
            json!({"sections": [
                {
                    "type": "text",
                    "id": "c-1",
                    "body": "La diabetes se asocia con hipertensión en muchos pacientes."
                }
            ]})
            .to_string(),
        ),
        (
            "guides/dm2/chapters/farmacos.json",
            json!({"sections": [
                {"type": "table", "id": "t-1", "rows": [{"cells": ["Metformina", "850 mg"]}]}
            ]})
            .to_string(),
        ),
    ]
}

/// [`sample_assets`] in a [`MemoryContentLoader`].
pub fn sample_library() -> MemoryContentLoader {
    sample_assets()
        .into_iter()
        .fold(MemoryContentLoader::new(), |loader, (path, json)| loader.with_asset(path, json))
}

/// Create a hit with one match range and empty preview.
pub fn make_hit(guide_slug: &str, chapter_path: &str, section_id: &str) -> SearchHit {
    let chapter_slug = chapter_path
        .rsplit('/')
        .next()
        .and_then(|file| file.strip_suffix(".json"))
        .unwrap_or(chapter_path);
    SearchHit {
        guide_slug: guide_slug.to_string(),
        chapter_slug: chapter_slug.to_string(),
        chapter_path: chapter_path.to_string(),
        section_id: section_id.to_string(),
        section_type: SectionType::Text,
        match_ranges: vec![MatchRange::new(0, 0)],
        preview: String::new(),
    }
}
