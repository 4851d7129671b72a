//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::unbounded;
use guide_search::{
    CancellationToken, ContentLoader, Result, SearchHit, SearchIndexEvent, SearchIndexer,
    SearchOutcome, SearchSession,
};
use tempfile::TempDir;

// Re-export canonical test utilities from guide_search::testing
pub use guide_search::testing::{
    make_hit, sample_assets, sample_library, MemoryContentLoader, HTA_DIAGNOSIS_BODY,
    HTA_TREATMENT_BODY,
};

// ============================================================================
// BUILDERS
// ============================================================================

pub fn indexer_over(loader: impl ContentLoader + 'static) -> Arc<SearchIndexer> {
    Arc::new(SearchIndexer::new(Arc::new(loader)))
}

pub fn session_over(loader: impl ContentLoader + 'static) -> SearchSession {
    SearchSession::new(indexer_over(loader))
}

/// Write the sample library to a fresh temporary directory.
pub fn sample_asset_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_assets(dir.path(), &sample_assets());
    dir
}

pub fn write_assets(root: &Path, assets: &[(&str, String)]) {
    for (rel, json) in assets {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("asset path has a parent")).expect("create dirs");
        fs::write(path, json).expect("write asset");
    }
}

// ============================================================================
// EVENT HELPERS
// ============================================================================

/// Run a search synchronously and collect everything it emitted.
pub fn run_collect(
    run: impl FnOnce(
        &crossbeam_channel::Sender<SearchIndexEvent>,
        &CancellationToken,
    ) -> Result<SearchOutcome>,
) -> (Result<SearchOutcome>, Vec<SearchIndexEvent>) {
    let (tx, rx) = unbounded();
    let outcome = run(&tx, &CancellationToken::new());
    drop(tx);
    (outcome, rx.iter().collect())
}

pub fn progress_events(events: &[SearchIndexEvent]) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter_map(|e| match e {
            SearchIndexEvent::Progress { done, total } => Some((*done, *total)),
            _ => None,
        })
        .collect()
}

pub fn streamed_hits(events: &[SearchIndexEvent]) -> Vec<SearchHit> {
    events
        .iter()
        .filter_map(|e| match e {
            SearchIndexEvent::PartialResults { hits } => Some(hits.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

pub fn done_count(events: &[SearchIndexEvent]) -> usize {
    events.iter().filter(|e| **e == SearchIndexEvent::Done).count()
}

// ============================================================================
// ASSERTIONS
// ============================================================================

/// Assert the event protocol: N+1 progress events counting 0..=N, partial
/// results only between them, and exactly one trailing `Done`.
pub fn assert_complete_stream(events: &[SearchIndexEvent], chapters: usize) {
    let progress = progress_events(events);
    let expected: Vec<(usize, usize)> = (0..=chapters).map(|done| (done, chapters)).collect();
    assert_eq!(progress, expected, "progress sequence");
    assert_eq!(events.first(), Some(&SearchIndexEvent::Progress { done: 0, total: chapters }));
    assert_eq!(events.last(), Some(&SearchIndexEvent::Done));
    assert_eq!(done_count(events), 1);
}
