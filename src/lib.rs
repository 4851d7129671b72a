// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Accent- and case-insensitive search over bundled clinical guidelines.
//!
//! Guides are JSON assets: a root manifest lists guides, each guide manifest
//! lists chapters, each chapter is an ordered list of typed sections. This
//! crate flattens chapters into searchable blocks, streams hits back as it
//! walks the library, and keeps the navigation state a reader UI needs to
//! jump between hits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  content.rs  │────▶│  blocks.rs   │────▶│   cache.rs   │
//! │ (manifests,  │     │ (extract_    │     │ (ChapterCache│
//! │ ContentLoader│     │   blocks)    │     │   LRU of 8)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │                    │                    │
//!        │             ┌──────────────┐            │
//!        │             │ normalize.rs │            │
//!        │             │ (fold + map) │            │
//!        │             └──────────────┘            │
//!        ▼                    ▼                    ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                     indexer.rs                      │
//! │  (search_everywhere / search_in_guide / chapter,    │
//! │   Progress ─ PartialResults ─ Done event stream)    │
//! └─────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                     session.rs                      │
//! │  (Idle/Indexing/Ready/Error, highlight + focus,     │
//! │   chapter-local navigation, recent queries)         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Coordinates
//!
//! Every offset is a char offset. Matching happens on folded text, but every
//! `MatchRange` a hit carries points into the text as authored.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use guide_search::{FsContentLoader, SearchFlags, SearchIndexer, SearchSession};
//!
//! let loader = Arc::new(FsContentLoader::new("assets"));
//! let mut session = SearchSession::new(Arc::new(SearchIndexer::new(loader)));
//!
//! session.start_search_all("hipertension", SearchFlags::default());
//! session.wait_for_completion();
//! if let Some(results) = session.last_results() {
//!     println!("{} matches", results.total);
//! }
//! ```

pub mod blocks;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod content;
pub mod error;
pub mod history;
pub mod indexer;
pub mod loader;
pub mod matching;
pub mod normalize;
pub mod session;
pub mod types;

pub mod testing;

pub use blocks::extract_blocks;
pub use cache::{ChapterCache, ChapterKey};
pub use cancel::CancellationToken;
pub use config::SearchConfig;
pub use content::{
    ChapterContent, ChapterEntry, ContentLoader, GuideEntry, GuideManifest, RootManifest, Section,
};
pub use error::{Result, SearchError};
pub use history::RecentQueries;
pub use indexer::{SearchIndexer, SearchOutcome, SearchStream, StreamPoll};
pub use loader::FsContentLoader;
pub use matching::build_hits_for_chapter;
pub use normalize::{normalize_for_search, normalize_query};
pub use session::{ListState, OpenChapter, SearchSession, SearchUiState};
pub use types::{
    progress_fraction, Block, ChapterIndex, MatchRange, NormalizedText, SearchFlags, SearchHit,
    SearchIndexEvent, SearchQuery, SearchResult, SectionType,
};
