//! Preset catalog storage, loading and indexing.
//!
//! The catalog holds presets, fields, categories and per-geometry default
//! lists. It is built by merging [`CatalogDelta`]s: each section maps ids to
//! raw JSON definitions, and a `null` definition removes the entry. Every
//! merge rebuilds the [`GeometryIndex`] from scratch.
//!
//! ## Embedded Catalog
//!
//! A small base catalog is compiled into the binary from `data/`. The
//! [`DataLoader`] serves it through [`EmbeddedFetcher`], or reads the same four
//! files from a directory with [`DirectoryFetcher`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use preset_index::PresetCatalog;
//! use preset_index::catalog::delta::CatalogDelta;
//! use serde_json::json;
//!
//! // Load embedded catalog
//! let mut catalog = PresetCatalog::load_embedded().unwrap();
//!
//! // Add a preset and drop another
//! catalog.merge(
//!     &CatalogDelta::new()
//!         .with_preset("amenity/bench", json!({"geometry": ["point"], "tags": {"amenity": "bench"}}))
//!         .remove_preset("shop/vacant"),
//! );
//!
//! // Export in merge-delta form
//! let json = catalog.to_json().unwrap();
//! ```
//!
//! [`CatalogDelta`]: delta::CatalogDelta
//! [`GeometryIndex`]: index::GeometryIndex
//! [`DataLoader`]: loader::DataLoader
//! [`EmbeddedFetcher`]: loader::EmbeddedFetcher
//! [`DirectoryFetcher`]: loader::DirectoryFetcher

pub mod classify;
pub mod delta;
pub mod embedded;
pub mod index;
pub mod loader;
pub mod store;
