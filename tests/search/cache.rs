//! Chapter cache behavior as seen through the indexer.

use std::sync::Arc;

use guide_search::{
    ChapterEntry, ChapterKey, SearchConfig, SearchFlags, SearchIndexer, SearchQuery,
};
use serde_json::json;

use crate::common::{run_collect, MemoryContentLoader};

/// One guide with `n` single-block chapters.
fn wide_library(n: usize) -> MemoryContentLoader {
    let chapters: Vec<_> = (0..n)
        .map(|i| json!({"slug": format!("c{}", i), "path": format!("c{}.json", i)}))
        .collect();
    let loader = MemoryContentLoader::new()
        .with_asset(
            "manifest.json",
            json!({"guides": [
                {"slug": "g", "title": "G", "manifestPath": "g/manifest.json"}
            ]})
            .to_string(),
        )
        .with_asset(
            "g/manifest.json",
            json!({"guide": {"title": "G"}, "chapters": chapters}).to_string(),
        );
    for i in 0..n {
        loader.insert(
            &format!("g/c{}.json", i),
            json!({"sections": [
                {"type": "text", "id": "s", "body": format!("capítulo {}", i)}
            ]})
            .to_string(),
        );
    }
    loader
}

fn key(i: usize) -> ChapterKey {
    ChapterKey::new("g", &format!("c{}.json", i), SearchFlags::default())
}

fn chapter(i: usize) -> ChapterEntry {
    ChapterEntry::new(&format!("c{}", i), &format!("c{}", i), &format!("c{}.json", i))
}

#[test]
fn nine_chapters_leave_eight_cached() {
    let indexer = SearchIndexer::new(Arc::new(wide_library(9)));
    let q = SearchQuery::new("capitulo", SearchFlags::default());
    let (outcome, _) =
        run_collect(|tx, token| indexer.search_in_guide("g", "g", None, &q, tx, token));
    assert!(outcome.is_ok());

    assert_eq!(indexer.cache().len(), 8);
    assert!(!indexer.cache().contains(&key(0)));
    assert!((1..9).all(|i| indexer.cache().contains(&key(i))));
}

#[test]
fn touched_chapter_survives_eviction() {
    let indexer = SearchIndexer::new(Arc::new(wide_library(9)));
    let flags = SearchFlags::default();
    for i in 0..8 {
        indexer.chapter_index("g", &chapter(i), flags).unwrap();
    }
    // Reading chapter 0 makes chapter 1 the least recently touched.
    indexer.chapter_index("g", &chapter(0), flags).unwrap();
    indexer.chapter_index("g", &chapter(8), flags).unwrap();

    assert_eq!(indexer.cache().len(), 8);
    assert!(indexer.cache().contains(&key(0)));
    assert!(!indexer.cache().contains(&key(1)));
}

#[test]
fn cache_hits_skip_the_loader() {
    let loader = Arc::new(wide_library(3));
    let indexer = SearchIndexer::new(loader.clone());
    let q = SearchQuery::new("capitulo", SearchFlags::default());
    for _ in 0..3 {
        run_collect(|tx, token| indexer.search_everywhere(&q, tx, token)).0.unwrap();
    }
    assert_eq!(loader.chapter_loads(), 3);
}

#[test]
fn flag_change_builds_separate_entries() {
    let loader = Arc::new(wide_library(1));
    let indexer = SearchIndexer::new(loader.clone());
    let ch = chapter(0);
    let folded = indexer.chapter_index("g", &ch, SearchFlags::default()).unwrap();
    let exact = indexer.chapter_index("g", &ch, SearchFlags::new(false, true)).unwrap();

    assert_eq!(loader.chapter_loads(), 2);
    assert_eq!(indexer.cache().len(), 2);
    assert_eq!(folded.blocks[0].normalized.normalized, "capitulo 0");
    assert_eq!(exact.blocks[0].normalized.normalized, "capítulo 0");
}

#[test]
fn configured_capacity_is_honored() {
    let config = SearchConfig {
        cache_capacity: 2,
        ..SearchConfig::default()
    };
    let indexer = SearchIndexer::with_config(Arc::new(wide_library(4)), config);
    let q = SearchQuery::new("capitulo", SearchFlags::default());
    run_collect(|tx, token| indexer.search_in_guide("g", "g", None, &q, tx, token)).0.unwrap();
    assert_eq!(indexer.cache().capacity(), 2);
    assert_eq!(indexer.cache().keys_by_recency(), vec![key(3), key(2)]);
}

#[test]
fn clearing_forces_reload() {
    let loader = Arc::new(wide_library(1));
    let indexer = SearchIndexer::new(loader.clone());
    indexer.chapter_index("g", &chapter(0), SearchFlags::default()).unwrap();
    indexer.clear_index_cache();
    indexer.chapter_index("g", &chapter(0), SearchFlags::default()).unwrap();
    assert_eq!(loader.chapter_loads(), 2);
}
