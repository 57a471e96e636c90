//! Core data types for preset matching.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Preset`]: A feature template matching a tag pattern for some geometries
//! - [`Field`]: An editable attribute, optionally offered on every preset
//! - [`Category`]: A named grouping of presets used in listings
//! - [`Tags`], [`TagPattern`]: Entity tags and the patterns presets require
//! - [`PresetId`], [`Geometry`]: Identifier and geometry class types
//!
//! ## Tag Patterns
//!
//! A preset's `tags` map each required key to a pattern:
//!
//! | JSON             | Pattern                   | Satisfied by          |
//! |------------------|---------------------------|-----------------------|
//! | `"bakery"`       | [`TagPattern::Exact`]     | exactly that value    |
//! | `["a", "b"]`     | [`TagPattern::OneOf`]     | any listed value      |
//! | `"*"`            | [`TagPattern::Any`]       | any value for the key |
//!
//! [`Preset`]: preset::Preset
//! [`Field`]: field::Field
//! [`Category`]: category::Category
//! [`Tags`]: tags::Tags
//! [`TagPattern`]: tags::TagPattern
//! [`TagPattern::Exact`]: tags::TagPattern::Exact
//! [`TagPattern::OneOf`]: tags::TagPattern::OneOf
//! [`TagPattern::Any`]: tags::TagPattern::Any
//! [`PresetId`]: types::PresetId
//! [`Geometry`]: types::Geometry

pub mod category;
pub mod field;
pub mod preset;
pub mod tags;
pub mod types;
