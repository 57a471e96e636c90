use serde::Serialize;

use crate::catalog::store::PresetCatalog;
use crate::core::preset::Preset;
use crate::core::tags::Tags;
use crate::core::types::Geometry;
use crate::matching::scoring::PresetScore;

/// Index key under which the generic address preset is registered
pub const ADDRESS_FALLBACK_KEY: &str = "addr:*";

/// Tag keys with this prefix make the address preset eligible
pub const ADDRESS_KEY_PREFIX: &str = "addr:";

/// An entity whose preset can be resolved against a graph
///
/// The resolver `R` is whatever graph context the host uses to compute
/// geometry and parent ways; the engine only passes it through.
pub trait MatchTarget<R: ?Sized> {
    fn tags(&self) -> &Tags;

    /// Effective geometry of the entity within the graph
    fn geometry(&self, resolver: &R) -> Geometry;

    /// True for nodes that lie on an address interpolation line
    fn is_on_address_line(&self, resolver: &R) -> bool;

    fn is_node(&self) -> bool;
}

/// How a match was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Highest scoring indexed preset
    Scored,
    /// Address preset chosen because an `addr:*` tag was present
    Address,
    /// Nothing qualified; the geometry's catch-all preset
    Fallback,
}

/// Result of matching a tag set
#[derive(Debug, Clone)]
pub struct PresetMatch<'a> {
    pub preset: &'a Preset,
    pub score: PresetScore,
    pub source: MatchSource,
}

/// Configuration for the matching engine
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Prefix of tag keys that count as address tags
    pub address_prefix: String,
    /// Index key of the address preset
    pub address_fallback_key: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            address_prefix: ADDRESS_KEY_PREFIX.to_string(),
            address_fallback_key: ADDRESS_FALLBACK_KEY.to_string(),
        }
    }
}

/// The main matching engine
pub struct MatchingEngine<'a> {
    catalog: &'a PresetCatalog,
    config: MatchingConfig,
}

impl<'a> MatchingEngine<'a> {
    /// Create a new matching engine with default configuration
    pub fn new(catalog: &'a PresetCatalog) -> Self {
        Self {
            catalog,
            config: MatchingConfig::default(),
        }
    }

    /// Create a new matching engine with custom configuration
    pub fn with_config(catalog: &'a PresetCatalog, config: MatchingConfig) -> Self {
        Self { catalog, config }
    }

    /// Best preset for a tag set and geometry; never fails
    pub fn match_tags(&self, tags: &Tags, geometry: Geometry) -> &'a Preset {
        self.find_match(tags, geometry).preset
    }

    /// Best preset for a tag set, with score and provenance.
    ///
    /// Tag keys are visited in ascending order and candidates in index order;
    /// a later candidate replaces the current best only on a strictly higher
    /// score, so ties go to the first seen.
    pub fn find_match(&self, tags: &Tags, geometry: Geometry) -> PresetMatch<'a> {
        let catalog = self.catalog;
        let fallback = catalog.fallback(geometry);
        let fallback_match = PresetMatch {
            preset: fallback,
            score: PresetScore::calculate(fallback, tags),
            source: MatchSource::Fallback,
        };

        let Some(candidates) = catalog.index().candidates(geometry) else {
            return fallback_match;
        };
        let presets = catalog.presets();
        let address_candidates = candidates.get(&self.config.address_fallback_key);

        let mut best: Option<(&'a Preset, PresetScore)> = None;
        let mut address: Option<&'a Preset> = None;

        for key in tags.keys() {
            if address.is_none() && key.starts_with(&self.config.address_prefix) {
                address = address_candidates
                    .and_then(|indices| indices.first())
                    .map(|&idx| &presets[idx]);
            }

            let Some(indices) = candidates.get(key) else {
                continue;
            };
            for &idx in indices {
                let preset = &presets[idx];
                let score = PresetScore::calculate(preset, tags);
                if !score.qualifies() {
                    continue;
                }
                if best.map_or(true, |(_, b)| score.value > b.value) {
                    best = Some((preset, score));
                }
            }
        }

        match (best, address) {
            (Some((preset, _)), Some(addr)) if preset.is_fallback() => PresetMatch {
                preset: addr,
                score: PresetScore::calculate(addr, tags),
                source: MatchSource::Address,
            },
            (Some((preset, score)), _) => PresetMatch {
                preset,
                score,
                source: MatchSource::Scored,
            },
            (None, Some(addr)) => PresetMatch {
                preset: addr,
                score: PresetScore::calculate(addr, tags),
                source: MatchSource::Address,
            },
            (None, None) => fallback_match,
        }
    }

    /// Best preset for an entity in its graph context.
    ///
    /// Vertices on address interpolation lines are matched as points.
    pub fn match_entity<R, E>(&self, entity: &E, resolver: &R) -> &'a Preset
    where
        R: ?Sized,
        E: MatchTarget<R>,
    {
        let mut geometry = entity.geometry(resolver);
        if geometry == Geometry::Vertex && entity.is_on_address_line(resolver) {
            geometry = Geometry::Point;
        }
        self.match_tags(entity.tags(), geometry)
    }

    /// Whether a node may be drawn as a vertex of a way
    pub fn allows_vertex<R, E>(&self, entity: &E, resolver: &R) -> bool
    where
        R: ?Sized,
        E: MatchTarget<R>,
    {
        if !entity.is_node() {
            return false;
        }
        if entity.tags().is_empty() {
            return true;
        }
        // address lines allow vertices to act as standalone points
        if entity.is_on_address_line(resolver) {
            return true;
        }

        let geometries = self.catalog.node_geometries_for_tags(entity.tags());
        if geometries.vertex {
            return true;
        }
        !geometries.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::delta::CatalogDelta;
    use crate::core::tags::tags_from;
    use serde_json::json;

    struct Node {
        tags: Tags,
        geometry: Geometry,
        on_address_line: bool,
    }

    impl MatchTarget<()> for Node {
        fn tags(&self) -> &Tags {
            &self.tags
        }

        fn geometry(&self, _: &()) -> Geometry {
            self.geometry
        }

        fn is_on_address_line(&self, _: &()) -> bool {
            self.on_address_line
        }

        fn is_node(&self) -> bool {
            matches!(self.geometry, Geometry::Point | Geometry::Vertex)
        }
    }

    fn make_test_catalog() -> PresetCatalog {
        let mut catalog = PresetCatalog::new();
        catalog.merge(
            &CatalogDelta::new()
                .with_preset(
                    "address",
                    json!({"geometry": ["point", "vertex", "area"], "tags": {"addr:*": "*"}, "matchScore": 0.15}),
                )
                .with_preset("shop", json!({"geometry": ["point", "area"], "tags": {"shop": "*"}}))
                .with_preset("shop/bakery", json!({"geometry": ["point", "area"], "tags": {"shop": "bakery"}}))
                .with_preset("amenity/cafe", json!({"geometry": ["point", "area"], "tags": {"amenity": "cafe"}}))
                .with_preset(
                    "amenity/cafe/coffee",
                    json!({"geometry": ["point"], "tags": {"amenity": "cafe", "cuisine": "coffee_shop"}}),
                )
                .with_preset("highway/crossing", json!({"geometry": ["vertex"], "tags": {"highway": "crossing"}}))
                .with_preset("entrance", json!({"geometry": ["vertex"], "tags": {"entrance": "*"}}))
                .with_preset("natural/tree", json!({"geometry": ["point", "vertex"], "tags": {"natural": "tree"}})),
        );
        catalog
    }

    #[test]
    fn test_specific_preset_beats_wildcard() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let m = engine.find_match(&tags_from([("shop", "bakery")]), Geometry::Point);
        assert_eq!(m.preset.id.as_str(), "shop/bakery");
        assert_eq!(m.source, MatchSource::Scored);

        let m = engine.match_tags(&tags_from([("shop", "butcher")]), Geometry::Point);
        assert_eq!(m.id.as_str(), "shop");
    }

    #[test]
    fn test_more_keys_win() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let tags = tags_from([("amenity", "cafe"), ("cuisine", "coffee_shop")]);
        assert_eq!(engine.match_tags(&tags, Geometry::Point).id.as_str(), "amenity/cafe/coffee");
        // the two-key preset is not declared for areas
        assert_eq!(engine.match_tags(&tags, Geometry::Area).id.as_str(), "amenity/cafe");
    }

    #[test]
    fn test_unmatched_tags_fall_back() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        for geometry in Geometry::ALL {
            let m = engine.find_match(&tags_from([("foo", "bar")]), geometry);
            assert_eq!(m.preset.id, geometry.fallback_id());
            assert_eq!(m.source, MatchSource::Fallback);
        }
        assert_eq!(engine.match_tags(&Tags::new(), Geometry::Line).id.as_str(), "line");
    }

    #[test]
    fn test_address_fallback() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let tags = tags_from([("addr:housenumber", "12"), ("addr:street", "Main")]);
        let m = engine.find_match(&tags, Geometry::Point);
        assert_eq!(m.preset.id.as_str(), "address");
        assert_eq!(m.source, MatchSource::Address);

        // a real match is preferred over the address preset
        let tags = tags_from([("addr:housenumber", "12"), ("shop", "bakery")]);
        assert_eq!(engine.match_tags(&tags, Geometry::Point).id.as_str(), "shop/bakery");

        // no address preset for lines
        let tags = tags_from([("addr:housenumber", "12")]);
        assert_eq!(engine.match_tags(&tags, Geometry::Line).id.as_str(), "line");
    }

    #[test]
    fn test_address_replaces_area_fallback() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let tags = tags_from([("addr:housenumber", "12"), ("area", "yes")]);
        assert_eq!(engine.match_tags(&tags, Geometry::Area).id.as_str(), "address");

        let tags = tags_from([("area", "yes")]);
        let m = engine.find_match(&tags, Geometry::Area);
        assert_eq!(m.preset.id.as_str(), "area");
        assert_eq!(m.source, MatchSource::Scored);
    }

    #[test]
    fn test_match_entity_on_address_line() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let vertex = Node {
            tags: tags_from([("addr:housenumber", "5")]),
            geometry: Geometry::Vertex,
            on_address_line: true,
        };
        let m = engine.match_entity(&vertex, &());
        assert_eq!(m.id.as_str(), "address");

        let crossing = Node {
            tags: tags_from([("highway", "crossing")]),
            geometry: Geometry::Vertex,
            on_address_line: true,
        };
        // matched as a point, where crossings are not indexed
        assert_eq!(engine.match_entity(&crossing, &()).id.as_str(), "point");

        let crossing = Node {
            on_address_line: false,
            ..crossing
        };
        assert_eq!(engine.match_entity(&crossing, &()).id.as_str(), "highway/crossing");
    }

    #[test]
    fn test_allows_vertex() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let node = |tags: Tags| Node {
            tags,
            geometry: Geometry::Point,
            on_address_line: false,
        };

        assert!(engine.allows_vertex(&node(Tags::new()), &()));
        assert!(engine.allows_vertex(&node(tags_from([("highway", "crossing")])), &()));
        assert!(engine.allows_vertex(&node(tags_from([("natural", "tree")])), &()));
        assert!(!engine.allows_vertex(&node(tags_from([("shop", "bakery")])), &()));
        assert!(engine.allows_vertex(&node(tags_from([("foo", "bar")])), &()));

        let way = Node {
            tags: Tags::new(),
            geometry: Geometry::Line,
            on_address_line: false,
        };
        assert!(!engine.allows_vertex(&way, &()));
    }
}
