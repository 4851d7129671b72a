// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the guide-search command-line interface.
//!
//! Two subcommands: `search` runs a query over an asset directory (the whole
//! library or one guide) and prints every hit with its matches highlighted,
//! `guides` lists what the asset directory bundles.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "guide-search",
    about = "Accent-insensitive search over bundled clinical guidelines",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the guides of an asset directory
    Search {
        /// Asset directory containing the root manifest.json
        #[arg(short, long)]
        assets: PathBuf,

        /// Restrict the search to one guide (by slug)
        #[arg(short, long)]
        guide: Option<String>,

        /// Distinguish upper and lower case
        #[arg(long)]
        case_sensitive: bool,

        /// Distinguish accented and unaccented letters
        #[arg(long)]
        accent_sensitive: bool,

        /// JSON file with search settings (cacheCapacity, previewContext, historyLimit)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Search query
        query: String,
    },

    /// List the guides of an asset directory
    Guides {
        /// Asset directory containing the root manifest.json
        #[arg(short, long)]
        assets: PathBuf,
    },
}
