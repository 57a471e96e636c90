//! Preset matching and scoring.
//!
//! - [`MatchingEngine`]: Finds the best preset for a tag set and geometry
//! - [`PresetScore`]: How well a tag set satisfies one preset
//!
//! ## Matching Algorithm
//!
//! 1. **Candidates**: presets indexed under the geometry for each tag key
//! 2. **Scoring**: each candidate scores its required tags; a missing key or
//!    wrong value disqualifies it
//! 3. **Address fallback**: `addr:*` tags select the address preset when
//!    nothing else qualified
//! 4. **Fallback**: the geometry's catch-all preset, so matching never fails
//!
//! ## Example
//!
//! ```rust,no_run
//! use preset_index::{Geometry, MatchingEngine, PresetCatalog};
//! use preset_index::core::tags::tags_from;
//!
//! let catalog = PresetCatalog::load_embedded().unwrap();
//! let engine = MatchingEngine::new(&catalog);
//!
//! let preset = engine.match_tags(&tags_from([("amenity", "cafe")]), Geometry::Point);
//! println!("{} ({})", preset.name, preset.id);
//! ```
//!
//! [`MatchingEngine`]: engine::MatchingEngine
//! [`PresetScore`]: scoring::PresetScore

pub mod engine;
pub mod scoring;

pub use engine::{MatchSource, MatchTarget, MatchingConfig, PresetMatch};
