//! Catalog data compiled into the binary.
//!
//! The four files under `data/` are validated by `build.rs` and served to the
//! loader by [`crate::catalog::loader::EmbeddedFetcher`].

use serde_json::Value;

use crate::catalog::delta::CatalogDelta;

const PRESET_CATEGORIES: &str = include_str!("../../data/preset_categories.json");
const PRESET_DEFAULTS: &str = include_str!("../../data/preset_defaults.json");
const PRESET_FIELDS: &str = include_str!("../../data/preset_fields.json");
const PRESET_PRESETS: &str = include_str!("../../data/preset_presets.json");

/// Raw contents of an embedded data file, by file name
pub fn embedded_file(file: &str) -> Option<&'static str> {
    match file {
        "preset_categories.json" => Some(PRESET_CATEGORIES),
        "preset_defaults.json" => Some(PRESET_DEFAULTS),
        "preset_fields.json" => Some(PRESET_FIELDS),
        "preset_presets.json" => Some(PRESET_PRESETS),
        _ => None,
    }
}

/// The embedded catalog as a single merge delta
pub fn embedded_delta() -> Result<CatalogDelta, serde_json::Error> {
    let parse = |s: &str| serde_json::from_str::<Value>(s);
    Ok(CatalogDelta::from_files(
        parse(PRESET_CATEGORIES)?,
        parse(PRESET_DEFAULTS)?,
        parse(PRESET_PRESETS)?,
        parse(PRESET_FIELDS)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_files_parse() {
        for file in [
            "preset_categories.json",
            "preset_defaults.json",
            "preset_fields.json",
            "preset_presets.json",
        ] {
            let raw = embedded_file(file).unwrap();
            let value: Value = serde_json::from_str(raw).unwrap();
            assert!(value.is_object(), "{file} should be an object");
        }
        assert!(embedded_file("imagery.json").is_none());
    }

    #[test]
    fn test_embedded_delta_has_all_sections() {
        let delta = embedded_delta().unwrap();
        assert!(delta.presets.is_some());
        assert!(delta.fields.is_some());
        assert!(delta.categories.is_some());
        assert!(delta.defaults.is_some());
    }
}
