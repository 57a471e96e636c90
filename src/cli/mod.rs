//! Command-line interface for preset-index.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **match**: Find the best preset for a set of tags
//! - **catalog**: List, show, or export presets from the catalog
//! - **classify**: Print the area, point and vertex classification tables
//! - **defaults**: Show the default presets offered for a geometry
//! - **recents**: Inspect or edit the recently-used preset ledger
//!
//! ## Usage
//!
//! ```text
//! # Match a tag set against the embedded catalog
//! preset-index match --geometry point amenity=cafe name=Dolce
//!
//! # Use catalog files from a directory
//! preset-index --data ./presets match -g area leisure=park
//!
//! # JSON output for scripting
//! preset-index --format json classify area-keys
//!
//! # Record a preset as recently used, then list defaults
//! preset-index --recents recents.json recents add amenity/cafe -g point
//! preset-index --recents recents.json defaults -g point -n 5
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::catalog::loader::DataLoader;
use crate::presets::PresetIndex;
use crate::recents::storage::JsonFileStorage;

pub mod catalog;
pub mod classify;
pub mod defaults;
pub mod match_tags;
pub mod recents;

#[derive(Parser)]
#[command(name = "preset-index")]
#[command(version)]
#[command(about = "Match OpenStreetMap-style tags against a catalog of feature presets")]
#[command(
    long_about = "preset-index loads a catalog of feature presets and answers the questions a map editor asks about them:\n- Which preset best describes this tag set?\n- Which presets should be offered for a new feature?\n- Does a closed way with these tags describe an area?"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub index: IndexOptions,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the preset that best matches a tag set
    Match(match_tags::MatchArgs),

    /// Inspect the preset catalog
    Catalog(catalog::CatalogArgs),

    /// Print derived classification tables
    Classify(classify::ClassifyArgs),

    /// Show the presets offered for a new feature
    Defaults(defaults::DefaultsArgs),

    /// Manage recently used presets
    Recents(recents::RecentsArgs),
}

/// Where the catalog and the recents ledger come from
#[derive(clap::Args, Clone, Debug, Default)]
pub struct IndexOptions {
    /// Directory holding preset_{presets,fields,categories,defaults}.json
    /// (defaults to the embedded catalog)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// JSON file persisting recently used presets (defaults to memory)
    #[arg(long, global = true)]
    pub recents: Option<PathBuf>,

    /// Intro mode: recent presets are neither offered nor recorded
    #[arg(long, global = true)]
    pub intro: bool,
}

impl IndexOptions {
    /// Load the catalog and open the recents ledger
    pub fn build(&self) -> anyhow::Result<PresetIndex> {
        let loader = match &self.data {
            Some(dir) => DataLoader::from_dir(dir),
            None => DataLoader::embedded(),
        };

        let mut index = PresetIndex::new();
        if let Some(path) = &self.recents {
            index = index.with_storage(Box::new(JsonFileStorage::new(path)));
        }
        index.set_intro_mode(self.intro);

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(index.init(&loader))
            .with_context(|| match &self.data {
                Some(dir) => format!("Failed to load catalog from {}", dir.display()),
                None => "Failed to load embedded catalog".to_string(),
            })?;

        debug!("Loaded {} presets", index.catalog().len());
        Ok(index)
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
