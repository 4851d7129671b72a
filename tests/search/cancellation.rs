//! Cooperative cancellation of running searches.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{bounded, Receiver};
use guide_search::{
    CancellationToken, ChapterContent, ContentLoader, GuideManifest, Result, RootManifest,
    SearchFlags, SearchIndexEvent, SearchOutcome, SearchQuery,
};

use crate::common::{done_count, indexer_over, run_collect, sample_library, MemoryContentLoader};

/// Cancels `token` once `after` chapters have been loaded.
struct CancellingLoader {
    inner: MemoryContentLoader,
    token: CancellationToken,
    after: usize,
    loads: AtomicUsize,
}

impl ContentLoader for CancellingLoader {
    fn load_root_manifest(&self) -> Result<RootManifest> {
        self.inner.load_root_manifest()
    }

    fn load_guide_manifest_by_path(&self, path: &str) -> Result<GuideManifest> {
        self.inner.load_guide_manifest_by_path(path)
    }

    fn load_chapter_content(&self, guide_dir: &str, chapter_path: &str) -> Result<ChapterContent> {
        if self.loads.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
            self.token.cancel();
        }
        self.inner.load_chapter_content(guide_dir, chapter_path)
    }
}

/// Blocks every chapter load until the gate yields (or closes).
struct GatedLoader {
    inner: MemoryContentLoader,
    gate: Receiver<()>,
}

impl ContentLoader for GatedLoader {
    fn load_root_manifest(&self) -> Result<RootManifest> {
        self.inner.load_root_manifest()
    }

    fn load_guide_manifest_by_path(&self, path: &str) -> Result<GuideManifest> {
        self.inner.load_guide_manifest_by_path(path)
    }

    fn load_chapter_content(&self, guide_dir: &str, chapter_path: &str) -> Result<ChapterContent> {
        let _ = self.gate.recv();
        self.inner.load_chapter_content(guide_dir, chapter_path)
    }
}

fn query() -> SearchQuery {
    SearchQuery::new("hipertension", SearchFlags::default())
}

#[test]
fn cancelled_mid_run_never_emits_done() {
    let token = CancellationToken::new();
    let loader = CancellingLoader {
        inner: sample_library(),
        token: token.clone(),
        after: 2,
        loads: AtomicUsize::new(0),
    };
    let indexer = indexer_over(loader);
    let q = query();
    let (tx, rx) = crossbeam_channel::unbounded();

    let outcome = indexer.search_everywhere(&q, &tx, &token).unwrap();
    drop(tx);
    let events: Vec<SearchIndexEvent> = rx.iter().collect();

    assert_eq!(outcome, SearchOutcome::Cancelled);
    assert_eq!(done_count(&events), 0);
    // Chapter 1 completed; chapter 2 was loaded but its results were withheld.
    assert_eq!(
        events.last(),
        Some(&SearchIndexEvent::Progress { done: 1, total: 5 })
    );
}

#[test]
fn pre_cancelled_token_emits_nothing() {
    let indexer = indexer_over(sample_library());
    let q = query();
    let token = CancellationToken::new();
    token.cancel();
    let (tx, rx) = crossbeam_channel::unbounded();
    let outcome = indexer
        .search_in_guide("guides/hta", "hta", None, &q, &tx, &token)
        .unwrap();
    drop(tx);
    assert_eq!(outcome, SearchOutcome::Cancelled);
    assert_eq!(rx.iter().count(), 0);
}

#[test]
fn cancelling_a_spawned_stream_stops_at_chapter_boundary() {
    let (gate_tx, gate_rx) = bounded::<()>(0);
    let indexer = indexer_over(GatedLoader {
        inner: sample_library(),
        gate: gate_rx,
    });

    let mut stream = indexer.spawn_search_everywhere(query(), CancellationToken::new());
    assert_eq!(stream.next(), Some(SearchIndexEvent::Progress { done: 0, total: 5 }));

    // The worker is parked inside the first chapter load.
    stream.cancel();
    drop(gate_tx);

    let rest: Vec<SearchIndexEvent> = stream.by_ref().collect();
    assert!(rest.is_empty(), "events after cancel: {:?}", rest);
    assert_eq!(stream.finish().unwrap(), SearchOutcome::Cancelled);
}

#[test]
fn uncancelled_control_run_completes() {
    let indexer = indexer_over(sample_library());
    let q = query();
    let (outcome, events) = run_collect(|tx, token| indexer.search_everywhere(&q, tx, token));
    assert_eq!(outcome.unwrap(), SearchOutcome::Completed);
    assert_eq!(done_count(&events), 1);
}
