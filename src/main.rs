// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use guide_search::{
    ContentLoader, FsContentLoader, SearchConfig, SearchError, SearchFlags, SearchIndexer,
    SearchSession, SearchUiState,
};

mod cli;
use cli::display::{self, themed, BOLD, GRAY, RED};
use cli::{Cli, Commands};

const PROGRESS_SCALE: u64 = 1000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let result = match Cli::parse().command {
        Commands::Search {
            assets,
            guide,
            case_sensitive,
            accent_sensitive,
            config,
            query,
        } => run_search(
            &assets,
            guide.as_deref(),
            SearchFlags::new(case_sensitive, accent_sensitive),
            config.as_deref(),
            &query,
        ),
        Commands::Guides { assets } => run_guides(&assets),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", themed(RED, &[BOLD], "error:"), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    SearchConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(PROGRESS_SCALE);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:<10} [{bar:40.cyan/dim}] {msg}")?
            .progress_chars("━━╸"),
    );
    pb.set_prefix("Searching");
    Ok(pb)
}

fn run_search(
    assets: &Path,
    guide: Option<&str>,
    flags: SearchFlags,
    config: Option<&Path>,
    query: &str,
) -> Result<()> {
    let config = load_config(config)?;
    let loader = Arc::new(FsContentLoader::new(assets));
    let indexer = Arc::new(SearchIndexer::with_config(loader.clone(), config));
    let mut session = SearchSession::new(indexer);

    match guide {
        Some(slug) => {
            let root = loader.load_root_manifest()?;
            let entry = root
                .guide_by_slug(slug)
                .ok_or_else(|| SearchError::GuideNotFound(slug.to_string()))?;
            let guide_dir = loader.guide_dir_from_manifest_path(&entry.manifest_path);
            session.start_search(&guide_dir, slug, query, flags);
        }
        None => session.start_search_all(query, flags),
    }

    let pb = progress_bar()?;
    while session.pump() {
        if let SearchUiState::Indexing { progress, message } = session.search_ui() {
            if let Some(fraction) = progress {
                pb.set_position((f64::from(*fraction) * PROGRESS_SCALE as f64) as u64);
            }
            pb.set_message(message.clone());
        }
        thread::sleep(Duration::from_millis(10));
    }
    pb.finish_and_clear();

    let results = match session.search_ui() {
        SearchUiState::Error { message } => bail!("search failed: {}", message),
        SearchUiState::Idle => bail!("nothing to search for"),
        _ => session
            .last_results()
            .context("search ended before completing")?,
    };
    let Some(parsed) = session.last_query() else {
        bail!("nothing to search for");
    };

    for hit in &results.hits {
        println!("{}", display::hit_header(hit));
        println!("    {}", display::highlight_preview(&hit.preview, parsed));
    }
    if !results.is_empty() {
        println!();
    }
    println!("{}", display::summary(results.hits.len(), results.total, &parsed.raw));
    Ok(())
}

fn run_guides(assets: &Path) -> Result<()> {
    let loader = FsContentLoader::new(assets);
    let root = loader.load_root_manifest()?;
    let width = root.guides.iter().map(|g| g.slug.chars().count()).max().unwrap_or(0) + 2;

    for guide in &root.guides {
        let chapters = match loader.load_guide_manifest_by_path(&guide.manifest_path) {
            Ok(manifest) => format!("{} chapters", manifest.chapters.len()),
            Err(e) => themed(RED, &[], &e.to_string()),
        };
        println!(
            "{}{}  {}",
            display::pad_right(&themed(display::CYAN, &[BOLD], &guide.slug), width),
            guide.title,
            themed(GRAY, &[], &format!("({})", chapters)),
        );
    }
    Ok(())
}
