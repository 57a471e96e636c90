//! Classification tables derived from the catalog.
//!
//! Geometry inference asks questions like "is a closed way tagged
//! `leisure=track` an area?" or "can a node tagged `highway=crossing` stand
//! alone?". The tables here answer them from preset declarations. Area keys
//! are computed on request; the point and vertex tables are rebuilt with the
//! geometry index on every merge.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::store::PresetCatalog;
use crate::core::preset::Preset;
use crate::core::tags::{Tags, WILDCARD};
use crate::core::types::Geometry;

/// Primary keys that imply lines even when some presets allow areas
pub const AREA_KEY_IGNORE: [&str; 6] = [
    "barrier", "highway", "footway", "railway", "junction", "type",
];

/// Key -> set of values, as computed for point and vertex tags
pub type TagTable = BTreeMap<String, BTreeSet<String>>;

/// Keeplist of area-implying keys, each with a discardlist of line values.
///
/// A closed way is an area when it carries a tag `(k, v)` with `k` in the
/// keeplist and `v` not in `k`'s discardlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AreaKeys(BTreeMap<String, BTreeSet<String>>);

impl AreaKeys {
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Discardlist for a key
    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.0.get(key)
    }

    /// Whether `key=value` is known to describe a line despite an area key
    pub fn is_discarded(&self, key: &str, value: &str) -> bool {
        self.0.get(key).is_some_and(|values| values.contains(value))
    }

    /// Classify a closed way by its tags
    pub fn is_area(&self, tags: &Tags) -> bool {
        match tags.get("area").map(String::as_str) {
            Some("yes") => return true,
            Some("no") => return false,
            _ => {}
        }
        tags.iter().any(|(k, v)| {
            self.0
                .get(k)
                .is_some_and(|discard| !discard.contains(v))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which standalone-node geometries a tag set implies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeGeometries {
    pub point: bool,
    pub vertex: bool,
}

fn is_classifiable(preset: &Preset) -> bool {
    !preset.suggestion && preset.replacement.is_none()
}

impl PresetCatalog {
    /// Build the area keeplist/discardlist from preset declarations
    pub fn area_keys(&self) -> AreaKeys {
        let presets: Vec<&Preset> = self
            .presets()
            .iter()
            .filter(|p| is_classifiable(p))
            .collect();
        let mut keys: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        // keeplist
        for preset in &presets {
            let Some((key, _)) = preset.primary_tag() else {
                continue;
            };
            if AREA_KEY_IGNORE.contains(&key) {
                continue;
            }
            if preset.match_geometry(Geometry::Area) {
                keys.entry(key.to_string()).or_default();
            }
        }

        // discardlist: every add tag counts, not just the primary one
        for preset in &presets {
            if !preset.match_geometry(Geometry::Line) {
                continue;
            }
            for (key, value) in preset.add_tags.iter() {
                if value == WILDCARD {
                    continue;
                }
                if let Some(discard) = keys.get_mut(key) {
                    discard.insert(value.clone());
                }
            }
        }

        AreaKeys(keys)
    }

    /// Primary tags of searchable presets that can be standalone points
    pub fn point_tags(&self) -> &TagTable {
        &self.node_tables().point
    }

    /// Primary tags of searchable presets that can be vertices
    pub fn vertex_tags(&self) -> &TagTable {
        &self.node_tables().vertex
    }

    /// Standalone-node geometries implied by a node's tags
    pub fn node_geometries_for_tags(&self, tags: &Tags) -> NodeGeometries {
        let tables = self.node_tables();
        node_geometries_for_tags(tags, &tables.point, &tables.vertex)
    }
}

/// Point and vertex tag tables, derived together from one preset scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTables {
    pub point: TagTable,
    pub vertex: TagTable,
}

impl NodeTables {
    pub fn build(presets: &[Preset]) -> Self {
        let mut tables = Self::default();
        for preset in presets {
            if !is_classifiable(preset) || !preset.searchable {
                continue;
            }
            let Some((key, pattern)) = preset.primary_tag() else {
                continue;
            };
            for (geometry, table) in [
                (Geometry::Point, &mut tables.point),
                (Geometry::Vertex, &mut tables.vertex),
            ] {
                if preset.match_geometry(geometry) {
                    let values = table.entry(key.to_string()).or_default();
                    values.extend(pattern.values().into_iter().map(str::to_string));
                }
            }
        }
        tables
    }
}

/// Standalone-node geometries implied by a node's tags, given precomputed tables
pub fn node_geometries_for_tags(
    tags: &Tags,
    point_tags: &TagTable,
    vertex_tags: &TagTable,
) -> NodeGeometries {
    let implies = |table: &TagTable, key: &str, value: &str| {
        table
            .get(key)
            .is_some_and(|values| values.contains(WILDCARD) || values.contains(value))
    };

    let mut geometries = NodeGeometries::default();
    for (key, value) in tags {
        geometries.point |= implies(point_tags, key.as_str(), value.as_str());
        geometries.vertex |= implies(vertex_tags, key.as_str(), value.as_str());
        if geometries.point && geometries.vertex {
            break;
        }
    }
    geometries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::delta::CatalogDelta;
    use crate::core::tags::tags_from;
    use serde_json::json;

    fn catalog(delta: CatalogDelta) -> PresetCatalog {
        let mut catalog = PresetCatalog::new();
        catalog.merge(&delta);
        catalog
    }

    #[test]
    fn test_area_keys_keeplist_and_discardlist() {
        let catalog = catalog(
            CatalogDelta::new()
                .with_preset("leisure/park", json!({"geometry": ["area"], "tags": {"leisure": "park"}}))
                .with_preset(
                    "leisure/track",
                    json!({"geometry": ["line"], "tags": {"leisure": "track"}, "addTags": {"leisure": "track"}}),
                ),
        );
        let keys = catalog.area_keys();

        assert!(keys.contains_key("leisure"));
        assert!(keys.is_discarded("leisure", "track"));
        assert!(keys.is_area(&tags_from([("leisure", "park")])));
        assert!(!keys.is_area(&tags_from([("leisure", "track")])));
    }

    #[test]
    fn test_area_keys_ignore_line_keys_suggestions_and_replacements() {
        let catalog = catalog(
            CatalogDelta::new()
                .with_preset("highway/pedestrian", json!({"geometry": ["area"], "tags": {"highway": "pedestrian"}}))
                .with_preset(
                    "brand",
                    json!({"geometry": ["area"], "tags": {"brand_key": "x"}, "suggestion": true}),
                )
                .with_preset(
                    "old",
                    json!({"geometry": ["area"], "tags": {"old_key": "x"}, "replacement": "new"}),
                )
                .with_preset("man_made/pier", json!({"geometry": ["line", "area"], "tags": {"man_made": "pier"}}))
                .with_preset(
                    "man_made/any",
                    json!({"geometry": ["line"], "tags": {"man_made": "*"}}),
                ),
        );
        let keys = catalog.area_keys();

        assert!(!keys.contains_key("highway"));
        assert!(!keys.contains_key("brand_key"));
        assert!(!keys.contains_key("old_key"));
        // area fallback's primary key is `area`
        assert!(keys.contains_key("area"));
        // pier is both; the wildcard add tag is never discarded
        assert!(keys.is_discarded("man_made", "pier"));
        assert!(!keys.is_discarded("man_made", "*"));
    }

    #[test]
    fn test_area_tag_overrides() {
        let keys = AreaKeys::default();
        assert!(keys.is_area(&tags_from([("area", "yes"), ("highway", "pedestrian")])));
        assert!(!keys.is_area(&tags_from([("area", "no")])));
        assert!(!keys.is_area(&tags_from([("name", "x")])));
    }

    #[test]
    fn test_point_and_vertex_tags() {
        let catalog = catalog(
            CatalogDelta::new()
                .with_preset("natural/tree", json!({"geometry": ["point", "vertex"], "tags": {"natural": "tree"}}))
                .with_preset("highway/crossing", json!({"geometry": ["vertex"], "tags": {"highway": "crossing"}}))
                .with_preset("amenity", json!({"geometry": ["point"], "tags": {"amenity": "*"}}))
                .with_preset(
                    "hidden",
                    json!({"geometry": ["point"], "tags": {"hidden": "x"}, "searchable": false}),
                ),
        );

        let points = catalog.point_tags();
        assert!(points["natural"].contains("tree"));
        assert!(points["amenity"].contains("*"));
        assert!(!points.contains_key("highway"));
        assert!(!points.contains_key("hidden"));

        let vertices = catalog.vertex_tags();
        assert!(vertices["highway"].contains("crossing"));
        assert!(vertices["natural"].contains("tree"));
    }

    #[test]
    fn test_node_tables_follow_merges() {
        let mut catalog = catalog(
            CatalogDelta::new()
                .with_preset("highway/crossing", json!({"geometry": ["vertex"], "tags": {"highway": "crossing"}})),
        );
        let crossing = tags_from([("highway", "crossing")]);
        assert!(catalog.node_geometries_for_tags(&crossing).vertex);

        catalog.merge(
            &CatalogDelta::new()
                .remove_preset("highway/crossing")
                .with_preset("amenity/bench", json!({"geometry": ["point"], "tags": {"amenity": "bench"}})),
        );
        assert!(!catalog.vertex_tags().contains_key("highway"));
        assert!(!catalog.node_geometries_for_tags(&crossing).vertex);
        assert!(catalog.point_tags()["amenity"].contains("bench"));

        let rebuilt = NodeTables::build(catalog.presets());
        assert_eq!(catalog.node_tables(), &rebuilt);
    }

    #[test]
    fn test_node_geometries() {
        let catalog = catalog(
            CatalogDelta::new()
                .with_preset("highway/crossing", json!({"geometry": ["vertex"], "tags": {"highway": "crossing"}}))
                .with_preset("amenity", json!({"geometry": ["point"], "tags": {"amenity": "*"}})),
        );

        let g = catalog.node_geometries_for_tags(&tags_from([("highway", "crossing")]));
        assert_eq!(g, NodeGeometries { point: false, vertex: true });

        let g = catalog.node_geometries_for_tags(&tags_from([("amenity", "bench")]));
        assert_eq!(g, NodeGeometries { point: true, vertex: false });

        let g = catalog.node_geometries_for_tags(&tags_from([("name", "x")]));
        assert_eq!(g, NodeGeometries::default());
    }
}
