//! # preset-index
//!
//! A library for matching OpenStreetMap-style tag sets against a catalog of
//! feature presets.
//!
//! A map editor needs to know what a feature *is* from its tags: a node
//! tagged `amenity=cafe` is a cafe, a closed way tagged `leisure=park` is a
//! park area, and a node carrying only `addr:*` tags is an address. Presets
//! describe these feature types, and `preset-index` keeps them indexed by
//! geometry and tag key so the best match is found quickly.
//!
//! ## Features
//!
//! - **Specificity scoring**: exact values outrank wildcards, more required
//!   tags outrank fewer
//! - **Total matching**: every geometry has a fallback preset
//! - **Incremental catalogs**: merge deltas that add, replace or remove entries
//! - **Recently used presets**: a bounded, persisted ledger blended into the
//!   default lists offered for new features
//! - **Geometry inference tables**: area keys, point tags and vertex tags
//!
//! ## Example
//!
//! ```rust,no_run
//! use preset_index::{DataLoader, Geometry, PresetIndex};
//! use preset_index::core::tags::tags_from;
//!
//! # async fn example() -> Result<(), preset_index::catalog::loader::LoadError> {
//! let mut index = PresetIndex::new();
//! index.init(&DataLoader::embedded()).await?;
//!
//! let tags = tags_from([("shop", "bakery"), ("name", "Crumbs")]);
//! let preset = index.match_tags(&tags, Geometry::Point);
//! println!("{}", preset.name);
//!
//! for preset in index.defaults(Geometry::Area, 5) {
//!     println!("{}", preset.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Catalog storage, loading and indexing
//! - [`core`]: Presets, fields, categories and tag patterns
//! - [`matching`]: Matching engine and scoring
//! - [`recents`]: Recently used preset ledger
//! - [`presets`]: The combined consumer-facing index
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod presets;
pub mod recents;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::delta::CatalogDelta;
pub use catalog::loader::DataLoader;
pub use catalog::store::PresetCatalog;
pub use core::preset::Preset;
pub use core::tags::Tags;
pub use core::types::*;
pub use matching::engine::MatchingEngine;
pub use presets::PresetIndex;
