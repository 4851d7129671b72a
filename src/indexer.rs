// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Search orchestration: one chapter, one guide, or the whole library.
//!
//! All three entry points share one loop:
//!
//! ```text
//! Progress{0, N}
//! for each chapter:
//!     cancelled? -> stop, no further events
//!     ensure indexed (cache or loader)
//!     PartialResults{hits}     (only if the chapter matched)
//!     Progress{done, N}
//! Done
//! ```
//!
//! so a guide with `N` chapters yields exactly `N + 1` progress events and
//! one `Done`. A consumer can render hits as soon as the first chapter
//! matches.
//!
//! # Failure policy
//!
//! Whole-library search skips chapters (and guides) that fail to load: they
//! count as done with zero hits and the stream still completes. Targeted
//! search propagates the failure as the `Err` of the run.
//!
//! # Cancellation
//!
//! Checked before each chapter. A receiver that hung up counts as cancelled.
//! A cancelled run never emits `Done`.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{self as channel, Receiver, Sender, TryRecvError};
use log::{debug, info, warn};

use crate::blocks::extract_blocks;
use crate::cache::{ChapterCache, ChapterKey};
use crate::cancel::CancellationToken;
use crate::config::SearchConfig;
use crate::content::{join_asset_path, ChapterContent, ChapterEntry, ContentLoader};
use crate::error::{Result, SearchError};
use crate::matching::build_hits_for_chapter;
use crate::types::{ChapterIndex, SearchFlags, SearchIndexEvent, SearchQuery};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// `Done` was emitted.
    Completed,
    /// Stopped at a chapter boundary; `Done` was not emitted.
    Cancelled,
}

/// What to do when a chapter cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadPolicy {
    Propagate,
    Skip,
}

/// One unit of work: a chapter and the guide it belongs to.
#[derive(Debug, Clone)]
struct ChapterJob {
    guide_dir: String,
    guide_slug: String,
    chapter: ChapterEntry,
}

pub struct SearchIndexer {
    loader: Arc<dyn ContentLoader>,
    cache: ChapterCache,
    config: SearchConfig,
}

impl SearchIndexer {
    pub fn new(loader: Arc<dyn ContentLoader>) -> Self {
        Self::with_config(loader, SearchConfig::default())
    }

    pub fn with_config(loader: Arc<dyn ContentLoader>, config: SearchConfig) -> Self {
        Self {
            loader,
            cache: ChapterCache::new(config.cache_capacity),
            config,
        }
    }

    pub fn loader(&self) -> &Arc<dyn ContentLoader> {
        &self.loader
    }

    pub fn cache(&self) -> &ChapterCache {
        &self.cache
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Drop every compiled chapter.
    pub fn clear_index_cache(&self) {
        self.cache.clear();
        debug!("chapter index cache cleared");
    }

    /// Compiled index of one chapter, from cache or freshly built.
    pub fn chapter_index(
        &self,
        guide_dir: &str,
        chapter: &ChapterEntry,
        flags: SearchFlags,
    ) -> Result<Arc<ChapterIndex>> {
        let key = ChapterKey::new(guide_dir, &chapter.path, flags);
        self.cache.get_or_build(key, || {
            let content = self.loader.load_chapter_content(guide_dir, &chapter.path)?;
            Ok(compile_chapter(chapter, &content, flags))
        })
    }

    fn lenient_chapter_index(
        &self,
        guide_dir: &str,
        chapter: &ChapterEntry,
        flags: SearchFlags,
    ) -> Option<Arc<ChapterIndex>> {
        let key = ChapterKey::new(guide_dir, &chapter.path, flags);
        self.cache
            .get_or_build(key, || {
                self.loader
                    .try_load_chapter_content(guide_dir, &chapter.path)
                    .map(|content| compile_chapter(chapter, &content, flags))
                    .ok_or(())
            })
            .ok()
    }

    /// Ordered chapters of the guide living in `guide_dir`.
    ///
    /// The manifest is located through the root manifest; if no guide there
    /// maps to `guide_dir`, `{guide_dir}/manifest.json` is tried directly.
    pub fn guide_chapters(&self, guide_dir: &str) -> Result<Vec<ChapterEntry>> {
        let root = self.loader.load_root_manifest()?;
        let manifest_path = root
            .guides
            .iter()
            .map(|g| &g.manifest_path)
            .find(|path| self.loader.guide_dir_from_manifest_path(path) == guide_dir)
            .cloned()
            .unwrap_or_else(|| join_asset_path(guide_dir, "manifest.json"));
        Ok(self.loader.load_guide_manifest_by_path(&manifest_path)?.chapters)
    }

    /// Search every chapter of one guide.
    ///
    /// `chapters` overrides the manifest's chapter list when given.
    pub fn search_in_guide(
        &self,
        guide_dir: &str,
        guide_slug: &str,
        chapters: Option<&[ChapterEntry]>,
        query: &SearchQuery,
        events: &Sender<SearchIndexEvent>,
        token: &CancellationToken,
    ) -> Result<SearchOutcome> {
        let chapters = match chapters {
            Some(chapters) => chapters.to_vec(),
            None => self.guide_chapters(guide_dir)?,
        };
        let jobs = chapters
            .into_iter()
            .map(|chapter| ChapterJob {
                guide_dir: guide_dir.to_string(),
                guide_slug: guide_slug.to_string(),
                chapter,
            })
            .collect();
        self.run(jobs, query, events, token, LoadPolicy::Propagate)
    }

    /// Search a single chapter. Progress total is 1.
    pub fn search_in_single_chapter(
        &self,
        guide_dir: &str,
        guide_slug: &str,
        chapter: &ChapterEntry,
        query: &SearchQuery,
        events: &Sender<SearchIndexEvent>,
        token: &CancellationToken,
    ) -> Result<SearchOutcome> {
        let job = ChapterJob {
            guide_dir: guide_dir.to_string(),
            guide_slug: guide_slug.to_string(),
            chapter: chapter.clone(),
        };
        self.run(vec![job], query, events, token, LoadPolicy::Propagate)
    }

    /// Search every chapter of every guide in the root manifest.
    ///
    /// All guide manifests are read before the first event so the progress
    /// total is the grand chapter count. Only a root manifest failure fails
    /// the run.
    pub fn search_everywhere(
        &self,
        query: &SearchQuery,
        events: &Sender<SearchIndexEvent>,
        token: &CancellationToken,
    ) -> Result<SearchOutcome> {
        let root = self.loader.load_root_manifest()?;
        let mut jobs = Vec::new();

        for guide in &root.guides {
            if token.is_cancelled() {
                return Ok(SearchOutcome::Cancelled);
            }
            let manifest = match self.loader.load_guide_manifest_by_path(&guide.manifest_path) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!("skipping guide {}: {}", guide.slug, e);
                    continue;
                }
            };
            let guide_dir = self.loader.guide_dir_from_manifest_path(&guide.manifest_path);
            jobs.extend(manifest.chapters.into_iter().map(|chapter| ChapterJob {
                guide_dir: guide_dir.clone(),
                guide_slug: guide.slug.clone(),
                chapter,
            }));
        }

        self.run(jobs, query, events, token, LoadPolicy::Skip)
    }

    fn run(
        &self,
        jobs: Vec<ChapterJob>,
        query: &SearchQuery,
        events: &Sender<SearchIndexEvent>,
        token: &CancellationToken,
        policy: LoadPolicy,
    ) -> Result<SearchOutcome> {
        let total = jobs.len();
        let emit = |event: SearchIndexEvent| !token.is_cancelled() && events.send(event).is_ok();

        debug!("searching {:?} across {} chapters", query.raw, total);
        if !emit(SearchIndexEvent::Progress { done: 0, total }) {
            return Ok(SearchOutcome::Cancelled);
        }

        let mut hit_count = 0;
        for (i, job) in jobs.iter().enumerate() {
            if token.is_cancelled() {
                debug!("search for {:?} cancelled after {}/{} chapters", query.raw, i, total);
                return Ok(SearchOutcome::Cancelled);
            }

            let index = match policy {
                LoadPolicy::Propagate => {
                    Some(self.chapter_index(&job.guide_dir, &job.chapter, query.flags)?)
                }
                LoadPolicy::Skip => {
                    self.lenient_chapter_index(&job.guide_dir, &job.chapter, query.flags)
                }
            };

            if let Some(index) = index {
                let hits = build_hits_for_chapter(
                    &index,
                    &job.guide_slug,
                    query,
                    self.config.preview_context,
                );
                if !hits.is_empty() {
                    hit_count += hits.len();
                    if !emit(SearchIndexEvent::PartialResults { hits }) {
                        return Ok(SearchOutcome::Cancelled);
                    }
                }
            }

            if !emit(SearchIndexEvent::Progress { done: i + 1, total }) {
                return Ok(SearchOutcome::Cancelled);
            }
        }

        if !emit(SearchIndexEvent::Done) {
            return Ok(SearchOutcome::Cancelled);
        }
        info!("search for {:?}: {} hits in {} chapters", query.raw, hit_count, total);
        Ok(SearchOutcome::Completed)
    }

    // =========================================================================
    // BACKGROUND STREAMS
    // =========================================================================

    /// Run `search_everywhere` on a worker thread.
    pub fn spawn_search_everywhere(
        self: &Arc<Self>,
        query: SearchQuery,
        token: CancellationToken,
    ) -> SearchStream {
        self.spawn(token, move |indexer, events, token| {
            indexer.search_everywhere(&query, events, token)
        })
    }

    /// Run `search_in_guide` (manifest chapter order) on a worker thread.
    pub fn spawn_search_in_guide(
        self: &Arc<Self>,
        guide_dir: String,
        guide_slug: String,
        query: SearchQuery,
        token: CancellationToken,
    ) -> SearchStream {
        self.spawn(token, move |indexer, events, token| {
            indexer.search_in_guide(&guide_dir, &guide_slug, None, &query, events, token)
        })
    }

    /// Run `search_in_single_chapter` on a worker thread.
    pub fn spawn_search_in_single_chapter(
        self: &Arc<Self>,
        guide_dir: String,
        guide_slug: String,
        chapter: ChapterEntry,
        query: SearchQuery,
        token: CancellationToken,
    ) -> SearchStream {
        self.spawn(token, move |indexer, events, token| {
            indexer.search_in_single_chapter(
                &guide_dir,
                &guide_slug,
                &chapter,
                &query,
                events,
                token,
            )
        })
    }

    fn spawn<F>(self: &Arc<Self>, token: CancellationToken, run: F) -> SearchStream
    where
        F: FnOnce(
                &SearchIndexer,
                &Sender<SearchIndexEvent>,
                &CancellationToken,
            ) -> Result<SearchOutcome>
            + Send
            + 'static,
    {
        let (tx, rx) = channel::unbounded();
        let indexer = Arc::clone(self);
        let worker_token = token.clone();
        let handle = thread::spawn(move || run(&*indexer, &tx, &worker_token));
        SearchStream {
            receiver: rx,
            handle: Some(handle),
            token,
        }
    }
}

fn compile_chapter(
    chapter: &ChapterEntry,
    content: &ChapterContent,
    flags: SearchFlags,
) -> ChapterIndex {
    ChapterIndex {
        chapter_slug: chapter.slug.clone(),
        chapter_path: chapter.path.clone(),
        blocks: extract_blocks(content, flags),
    }
}

/// Events of a search running on a worker thread.
///
/// Iterating blocks until the next event and ends when the worker is done.
/// `finish` then reports how the run ended. Dropping the stream cancels it.
pub struct SearchStream {
    receiver: Receiver<SearchIndexEvent>,
    handle: Option<JoinHandle<Result<SearchOutcome>>>,
    token: CancellationToken,
}

/// Non-blocking poll result.
#[derive(Debug)]
pub enum StreamPoll {
    Event(SearchIndexEvent),
    Pending,
    Finished,
}

impl SearchStream {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Next event if one is ready, without blocking.
    pub fn poll(&self) -> StreamPoll {
        match self.receiver.try_recv() {
            Ok(event) => StreamPoll::Event(event),
            Err(TryRecvError::Empty) => StreamPoll::Pending,
            Err(TryRecvError::Disconnected) => StreamPoll::Finished,
        }
    }

    /// Wait for the worker and return its outcome.
    ///
    /// Events not yet received are discarded.
    pub fn finish(mut self) -> Result<SearchOutcome> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SearchError::Worker("search thread panicked".to_string()))?,
            None => Ok(SearchOutcome::Cancelled),
        }
    }
}

impl Iterator for SearchStream {
    type Item = SearchIndexEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

impl Drop for SearchStream {
    fn drop(&mut self) {
        // Detach: the worker sees the token at its next chapter boundary.
        if self.handle.is_some() {
            self.token.cancel();
        }
    }
}
