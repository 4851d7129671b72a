// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Search session controller: the state a reader UI renders while the user
//! searches and jumps between hits.
//!
//! # Lifecycle
//!
//! ```text
//!            start_*                Progress/PartialResults        Done
//!   Idle ─────────────▶ Indexing ◀──────────────────────▶ Ready ──────▶ Ready (final)
//!     ▲                    │                                 │
//!     │   exit_search_mode │ load failure (targeted search)  │
//!     └────────────────────┴──────────▶ Error ◀──────────────┘
//! ```
//!
//! Only one stream is alive per session. Starting a query cancels the one in
//! flight and resets highlight and navigation state.
//!
//! The session never blocks on its own. The owner calls [`SearchSession::pump`]
//! from its event loop, or [`SearchSession::wait_for_completion`] when it is
//! happy to block (CLI, tests).
//!
//! # Highlight vs. focus
//!
//! `active_highlight` is sticky: it names the hit the UI paints until another
//! hit is opened or search mode is left. `pending_focus` is a one-shot scroll
//! request; the UI takes it with [`SearchSession::consume_pending_focus`].

use std::mem;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::content::{join_asset_path, ChapterContent, ChapterEntry, GuideEntry};
use crate::error::{Result, SearchError};
use crate::history::RecentQueries;
use crate::indexer::{SearchIndexer, SearchOutcome, SearchStream, StreamPoll};
use crate::normalize::normalize_query;
use crate::types::{
    progress_fraction, SearchFlags, SearchHit, SearchIndexEvent, SearchQuery, SearchResult,
};

/// State of the guide list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading,
    Loaded(Vec<GuideEntry>),
    Error(String),
}

/// What the search panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchUiState {
    Idle,
    Indexing {
        /// `None` while the chapter total is unknown.
        progress: Option<f32>,
        message: String,
    },
    Ready {
        results: SearchResult,
        current_hit_index: usize,
    },
    Error {
        message: String,
    },
}

/// The chapter currently shown by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenChapter {
    pub guide_slug: String,
    pub guide_dir: String,
    pub chapter: ChapterEntry,
    pub content: ChapterContent,
}

pub struct SearchSession {
    indexer: Arc<SearchIndexer>,
    stream: Option<SearchStream>,

    list_state: ListState,
    search_ui: SearchUiState,
    open_chapter: Option<OpenChapter>,

    is_search_mode: bool,
    last_query: Option<SearchQuery>,
    last_results: Option<SearchResult>,
    accumulated: Vec<SearchHit>,
    current_hit_index: usize,

    active_highlight: Option<SearchHit>,
    pending_focus: Option<SearchHit>,
    chapter_hits: Vec<SearchHit>,
    current_chapter_hit_index: usize,

    recent_queries: RecentQueries,
}

impl SearchSession {
    pub fn new(indexer: Arc<SearchIndexer>) -> Self {
        let recent_queries = RecentQueries::new(indexer.config().history_limit);
        Self {
            indexer,
            stream: None,
            list_state: ListState::Loading,
            search_ui: SearchUiState::Idle,
            open_chapter: None,
            is_search_mode: false,
            last_query: None,
            last_results: None,
            accumulated: Vec::new(),
            current_hit_index: 0,
            active_highlight: None,
            pending_focus: None,
            chapter_hits: Vec::new(),
            current_chapter_hit_index: 0,
            recent_queries,
        }
    }

    // =========================================================================
    // GUIDES AND CHAPTERS
    // =========================================================================

    /// Load the guide list from the root manifest.
    pub fn load_guides(&mut self) {
        self.list_state = ListState::Loading;
        self.list_state = match self.indexer.loader().load_root_manifest() {
            Ok(root) => ListState::Loaded(root.guides),
            Err(e) => {
                warn!("failed to load guide list: {}", e);
                ListState::Error(e.to_string())
            }
        };
    }

    /// Load a chapter and make it the open one.
    pub fn open_chapter(
        &mut self,
        guide_slug: &str,
        guide_dir: &str,
        chapter: ChapterEntry,
    ) -> Result<()> {
        let content = self.indexer.loader().load_chapter_content(guide_dir, &chapter.path)?;
        debug!("opened {}", join_asset_path(guide_dir, &chapter.path));
        self.open_chapter = Some(OpenChapter {
            guide_slug: guide_slug.to_string(),
            guide_dir: guide_dir.to_string(),
            chapter,
            content,
        });
        Ok(())
    }

    // =========================================================================
    // STARTING AND STOPPING
    // =========================================================================

    /// Search every guide.
    pub fn start_search_all(&mut self, raw_query: &str, flags: SearchFlags) {
        if let Some(query) = self.begin(raw_query, flags) {
            let stream = self.indexer.spawn_search_everywhere(query, CancellationToken::new());
            self.stream = Some(stream);
        }
    }

    /// Search one guide.
    pub fn start_search(
        &mut self,
        guide_dir: &str,
        guide_slug: &str,
        raw_query: &str,
        flags: SearchFlags,
    ) {
        if let Some(query) = self.begin(raw_query, flags) {
            let stream = self.indexer.spawn_search_in_guide(
                guide_dir.to_string(),
                guide_slug.to_string(),
                query,
                CancellationToken::new(),
            );
            self.stream = Some(stream);
        }
    }

    /// Search the guide of the open chapter, or everything if none is open.
    pub fn start_search_in_active_chapter(&mut self, raw_query: &str, flags: SearchFlags) {
        match &self.open_chapter {
            Some(open) => {
                let (guide_dir, guide_slug) = (open.guide_dir.clone(), open.guide_slug.clone());
                self.start_search(&guide_dir, &guide_slug, raw_query, flags);
            }
            None => self.start_search_all(raw_query, flags),
        }
    }

    /// Shared preamble of every `start_*`. `None` for a blank query.
    fn begin(&mut self, raw_query: &str, flags: SearchFlags) -> Option<SearchQuery> {
        let query = SearchQuery::new(raw_query, flags);
        if query.is_blank() {
            debug!("ignoring blank query");
            return None;
        }

        self.cancel_stream();
        self.reset_navigation();
        self.accumulated.clear();
        self.last_results = None;

        self.is_search_mode = true;
        self.recent_queries.remember(&query.raw);
        self.search_ui = SearchUiState::Indexing {
            progress: None,
            message: format!("Searching for \"{}\"", query.raw),
        };
        self.last_query = Some(query.clone());
        Some(query)
    }

    /// Leave search mode: cancel, forget the query, clear all navigation.
    pub fn exit_search_mode(&mut self) {
        self.cancel_stream();
        self.is_search_mode = false;
        self.last_query = None;
        self.last_results = None;
        self.accumulated.clear();
        self.reset_navigation();
        self.search_ui = SearchUiState::Idle;
    }

    fn cancel_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.cancel();
        }
    }

    fn reset_navigation(&mut self) {
        self.current_hit_index = 0;
        self.active_highlight = None;
        self.pending_focus = None;
        self.chapter_hits.clear();
        self.current_chapter_hit_index = 0;
    }

    // =========================================================================
    // EVENT ACCUMULATION
    // =========================================================================

    /// Apply every event that is ready without blocking.
    ///
    /// Returns `true` while a stream is still running.
    pub fn pump(&mut self) -> bool {
        loop {
            let poll = match &self.stream {
                Some(stream) => stream.poll(),
                None => return false,
            };
            match poll {
                StreamPoll::Event(event) => self.apply(event),
                StreamPoll::Pending => return true,
                StreamPoll::Finished => {
                    self.finish_stream();
                    return false;
                }
            }
        }
    }

    /// Block until the running stream, if any, has ended.
    pub fn wait_for_completion(&mut self) {
        loop {
            let event = match self.stream.as_mut() {
                Some(stream) => stream.next(),
                None => return,
            };
            match event {
                Some(event) => self.apply(event),
                None => {
                    self.finish_stream();
                    return;
                }
            }
        }
    }

    pub fn is_searching(&self) -> bool {
        self.stream.is_some()
    }

    fn apply(&mut self, event: SearchIndexEvent) {
        match event {
            SearchIndexEvent::Progress { done, total } => {
                self.search_ui = SearchUiState::Indexing {
                    progress: progress_fraction(done, total),
                    message: format!("Searched {} of {} chapters", done, total),
                };
            }
            SearchIndexEvent::PartialResults { hits } => {
                self.accumulated.extend(hits);
                self.search_ui = SearchUiState::Ready {
                    results: SearchResult::from_hits(self.accumulated.clone()),
                    current_hit_index: self.current_hit_index,
                };
            }
            SearchIndexEvent::Done => {
                let results = SearchResult::from_hits(mem::take(&mut self.accumulated));
                info!("search finished: {} hits, {} matches", results.hits.len(), results.total);
                self.current_hit_index = 0;
                self.search_ui = SearchUiState::Ready {
                    results: results.clone(),
                    current_hit_index: 0,
                };
                self.last_results = Some(results);
            }
        }
    }

    fn finish_stream(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        match stream.finish() {
            Ok(SearchOutcome::Completed) | Ok(SearchOutcome::Cancelled) => {}
            Err(e) => {
                warn!("search failed: {}", e);
                self.search_ui = SearchUiState::Error { message: e.to_string() };
            }
        }
    }

    // =========================================================================
    // HIT NAVIGATION
    // =========================================================================

    /// Open the chapter of `hit`, highlight it and queue a scroll to it.
    ///
    /// Failures leave the session as it was.
    pub fn handle_open_hit(&mut self, hit: &SearchHit) {
        if let Err(e) = self.open_hit(hit) {
            warn!("could not open hit {} in {}: {}", hit.section_id, hit.chapter_path, e);
        }
    }

    fn open_hit(&mut self, hit: &SearchHit) -> Result<()> {
        let loader = Arc::clone(self.indexer.loader());
        let root = loader.load_root_manifest()?;
        let guide = root
            .guide_by_slug(&hit.guide_slug)
            .or_else(|| {
                let wanted = normalize_query(&hit.guide_slug, SearchFlags::default());
                root.guides
                    .iter()
                    .find(|g| normalize_query(&g.title, SearchFlags::default()) == wanted)
            })
            .ok_or_else(|| SearchError::GuideNotFound(hit.guide_slug.clone()))?;

        let guide_dir = loader.guide_dir_from_manifest_path(&guide.manifest_path);
        let manifest = loader.load_guide_manifest_by_path(&guide.manifest_path)?;
        let chapter = manifest
            .chapters
            .iter()
            .find(|c| c.path == hit.chapter_path)
            .or_else(|| manifest.chapters.iter().find(|c| c.slug == hit.chapter_slug))
            .cloned()
            .ok_or_else(|| SearchError::NotFound {
                path: join_asset_path(&guide_dir, &hit.chapter_path),
            })?;

        self.open_chapter(&guide.slug, &guide_dir, chapter)?;

        self.chapter_hits = self
            .source_hits()
            .iter()
            .filter(|h| h.is_in_chapter(&hit.guide_slug, &hit.chapter_path))
            .cloned()
            .collect();
        let local = self.chapter_hits.iter().position(|h| h == hit).unwrap_or(0);
        self.current_chapter_hit_index = local;
        self.active_highlight = Some(hit.clone());
        self.pending_focus = Some(hit.clone());
        self.sync_global_index(hit);
        Ok(())
    }

    /// Step to the next chapter-local hit, wrapping around.
    pub fn go_to_next_hit(&mut self) {
        let len = self.chapter_hits.len();
        if len > 0 {
            self.focus_chapter_hit((self.current_chapter_hit_index + 1) % len);
        }
    }

    /// Step to the previous chapter-local hit, wrapping around.
    pub fn go_to_prev_hit(&mut self) {
        let len = self.chapter_hits.len();
        if len > 0 {
            self.focus_chapter_hit((self.current_chapter_hit_index + len - 1) % len);
        }
    }

    fn focus_chapter_hit(&mut self, index: usize) {
        let Some(hit) = self.chapter_hits.get(index).cloned() else {
            return;
        };
        self.current_chapter_hit_index = index;
        self.sync_global_index(&hit);
        self.active_highlight = Some(hit.clone());
        self.pending_focus = Some(hit);
    }

    fn sync_global_index(&mut self, hit: &SearchHit) {
        let Some(index) = self.source_hits().iter().position(|h| h == hit) else {
            return;
        };
        self.current_hit_index = index;
        if let SearchUiState::Ready { current_hit_index, .. } = &mut self.search_ui {
            *current_hit_index = index;
        }
    }

    /// Final hits if the last search finished, otherwise what has streamed in.
    fn source_hits(&self) -> &[SearchHit] {
        match &self.last_results {
            Some(results) => &results.hits,
            None => &self.accumulated,
        }
    }

    /// Take the pending scroll request.
    pub fn consume_pending_focus(&mut self) -> Option<SearchHit> {
        self.pending_focus.take()
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    pub fn remember_query(&mut self, raw_query: &str) {
        self.recent_queries.remember(raw_query);
    }

    pub fn clear_history(&mut self) {
        self.recent_queries.clear();
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn indexer(&self) -> &Arc<SearchIndexer> {
        &self.indexer
    }

    pub fn list_state(&self) -> &ListState {
        &self.list_state
    }

    pub fn search_ui(&self) -> &SearchUiState {
        &self.search_ui
    }

    pub fn open_chapter_state(&self) -> Option<&OpenChapter> {
        self.open_chapter.as_ref()
    }

    pub fn is_search_mode(&self) -> bool {
        self.is_search_mode
    }

    pub fn last_query(&self) -> Option<&SearchQuery> {
        self.last_query.as_ref()
    }

    pub fn last_results(&self) -> Option<&SearchResult> {
        self.last_results.as_ref()
    }

    pub fn current_hit_index(&self) -> usize {
        self.current_hit_index
    }

    pub fn active_highlight(&self) -> Option<&SearchHit> {
        self.active_highlight.as_ref()
    }

    /// Peek at the pending scroll request without consuming it.
    pub fn pending_focus(&self) -> Option<&SearchHit> {
        self.pending_focus.as_ref()
    }

    pub fn chapter_hits(&self) -> &[SearchHit] {
        &self.chapter_hits
    }

    pub fn current_chapter_hit_index(&self) -> usize {
        self.current_chapter_hit_index
    }

    pub fn recent_queries(&self) -> &[String] {
        self.recent_queries.as_slice()
    }
}
