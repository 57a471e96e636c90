use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

use crate::core::tags::{AddTags, TagPattern, TagPatterns, Tags};
use crate::core::types::{Geometry, PresetId};

/// Match score given to presets that do not declare one
pub const DEFAULT_MATCH_SCORE: f64 = 1.0;

/// Match score of the per-geometry fallback presets
pub const FALLBACK_MATCH_SCORE: f64 = 0.1;

/// Ids of the four fallback presets
pub const FALLBACK_IDS: [&str; 4] = ["point", "line", "area", "relation"];

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

pub(crate) fn deserialize_geometry<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Geometry>, D::Error> {
    // Unknown geometry names are dropped rather than rejected
    let names = Vec::<String>::deserialize(deserializer)?;
    let mut geometry = Vec::with_capacity(names.len());
    for g in names.iter().filter_map(|n| Geometry::parse(n)) {
        if !geometry.contains(&g) {
            geometry.push(g);
        }
    }
    Ok(geometry)
}

/// Preset as it appears in catalog data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_geometry")]
    pub geometry: Vec<Geometry>,

    #[serde(default)]
    pub tags: TagPatterns,

    /// Defaults to `tags` when absent
    #[serde(default, rename = "addTags", skip_serializing_if = "Option::is_none")]
    pub add_tags: Option<AddTags>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(default, rename = "moreFields", skip_serializing_if = "Vec::is_empty")]
    pub more_fields: Vec<String>,

    #[serde(default, rename = "matchScore", skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub searchable: bool,

    /// Sourced from the name suggestion index
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub suggestion: bool,

    /// Successor of a deprecated preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A feature template: a tag pattern for one or more geometry classes
#[derive(Debug, Clone)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    pub geometry: Vec<Geometry>,
    pub tags: TagPatterns,
    pub add_tags: AddTags,
    pub fields: Vec<String>,
    pub more_fields: Vec<String>,
    /// Baseline specificity weight
    pub match_score: f64,
    pub searchable: bool,
    pub suggestion: bool,
    pub replacement: Option<PresetId>,
    pub terms: Vec<String>,
    pub icon: Option<String>,

    addable: bool,

    /// Field ids after parent inheritance; cleared on every catalog merge
    resolved_fields: OnceLock<Vec<String>>,
    resolved_more_fields: OnceLock<Vec<String>>,
}

impl Preset {
    pub fn from_definition(id: impl Into<String>, def: PresetDefinition, addable: bool) -> Self {
        let id = PresetId::new(id);
        let add_tags = def.add_tags.unwrap_or_else(|| def.tags.to_add_tags());
        Self {
            name: def.name.unwrap_or_else(|| id.to_string()),
            id,
            geometry: def.geometry,
            tags: def.tags,
            add_tags,
            fields: def.fields,
            more_fields: def.more_fields,
            match_score: def.match_score.unwrap_or(DEFAULT_MATCH_SCORE),
            searchable: def.searchable,
            suggestion: def.suggestion,
            replacement: def.replacement.map(PresetId::new),
            terms: def.terms,
            icon: def.icon,
            addable,
            resolved_fields: OnceLock::new(),
            resolved_more_fields: OnceLock::new(),
        }
    }

    /// The catch-all preset for a geometry class
    pub fn fallback(geometry: Geometry) -> Self {
        let geometry = geometry.fallback_geometry();
        let (name, geometries, tags): (&str, Vec<Geometry>, TagPatterns) = match geometry {
            Geometry::Point | Geometry::Vertex => (
                "Point",
                vec![Geometry::Point, Geometry::Vertex],
                TagPatterns::new(),
            ),
            Geometry::Line => ("Line", vec![Geometry::Line], TagPatterns::new()),
            Geometry::Area => (
                "Area",
                vec![Geometry::Area],
                [("area", TagPattern::from("yes"))].into_iter().collect(),
            ),
            Geometry::Relation => ("Relation", vec![Geometry::Relation], TagPatterns::new()),
        };

        let def = PresetDefinition {
            name: Some(name.to_string()),
            geometry: geometries,
            tags,
            match_score: Some(FALLBACK_MATCH_SCORE),
            searchable: true,
            ..PresetDefinition::default()
        };
        Self::from_definition(geometry.as_str(), def, true)
    }

    /// Whether this is one of the four per-geometry fallback presets
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        FALLBACK_IDS.contains(&self.id.as_str())
    }

    #[must_use]
    pub fn addable(&self) -> bool {
        self.addable
    }

    pub fn set_addable(&mut self, addable: bool) {
        self.addable = addable;
    }

    /// Whether this preset declares the given geometry
    #[must_use]
    pub fn match_geometry(&self, geometry: Geometry) -> bool {
        self.geometry.contains(&geometry)
    }

    /// Specificity score for a tag set; negative when the preset does not apply
    #[must_use]
    pub fn match_score(&self, tags: &Tags) -> f64 {
        crate::matching::scoring::score_preset(self, tags)
    }

    /// First declared required tag
    #[must_use]
    pub fn primary_tag(&self) -> Option<(&str, &TagPattern)> {
        self.tags.first()
    }

    pub(crate) fn resolved_fields_cell(&self) -> &OnceLock<Vec<String>> {
        &self.resolved_fields
    }

    pub(crate) fn resolved_more_fields_cell(&self) -> &OnceLock<Vec<String>> {
        &self.resolved_more_fields
    }

    /// Drop cached field resolution so it is recomputed on next access
    pub fn reset_fields(&mut self) {
        self.resolved_fields = OnceLock::new();
        self.resolved_more_fields = OnceLock::new();
    }

    /// Convert back into catalog data form
    #[must_use]
    pub fn to_definition(&self) -> PresetDefinition {
        PresetDefinition {
            name: Some(self.name.clone()),
            geometry: self.geometry.clone(),
            tags: self.tags.clone(),
            add_tags: Some(self.add_tags.clone()),
            fields: self.fields.clone(),
            more_fields: self.more_fields.clone(),
            match_score: Some(self.match_score),
            searchable: self.searchable,
            suggestion: self.suggestion,
            replacement: self.replacement.as_ref().map(ToString::to_string),
            terms: self.terms.clone(),
            icon: self.icon.clone(),
        }
    }
}

impl PartialEq for Preset {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_defaults() {
        let def: PresetDefinition =
            serde_json::from_str(r#"{"geometry": ["point", "area"], "tags": {"shop": "bakery"}}"#)
                .unwrap();
        let preset = Preset::from_definition("shop/bakery", def, true);

        assert_eq!(preset.name, "shop/bakery");
        assert!(preset.searchable);
        assert!(!preset.suggestion);
        assert!((preset.match_score - DEFAULT_MATCH_SCORE).abs() < f64::EPSILON);
        assert_eq!(preset.add_tags.get("shop").map(String::as_str), Some("bakery"));
        assert!(preset.match_geometry(Geometry::Area));
        assert!(!preset.match_geometry(Geometry::Line));
    }

    #[test]
    fn test_unknown_geometry_is_dropped() {
        let def: PresetDefinition =
            serde_json::from_str(r#"{"geometry": ["point", "blob", "point"], "tags": {}}"#).unwrap();
        assert_eq!(def.geometry, vec![Geometry::Point]);
    }

    #[test]
    fn test_fallbacks() {
        let point = Preset::fallback(Geometry::Vertex);
        assert_eq!(point.id.as_str(), "point");
        assert!(point.is_fallback());
        assert!(point.match_geometry(Geometry::Vertex));

        let area = Preset::fallback(Geometry::Area);
        assert_eq!(area.primary_tag().map(|(k, _)| k), Some("area"));
        assert!((area.match_score - FALLBACK_MATCH_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_definition_round_trip_keeps_flags() {
        let def: PresetDefinition = serde_json::from_str(
            r#"{"geometry": ["line"], "tags": {"highway": "road"}, "searchable": false, "replacement": "highway/unclassified"}"#,
        )
        .unwrap();
        let preset = Preset::from_definition("highway/road", def, false);
        let back = preset.to_definition();
        assert!(!back.searchable);
        assert_eq!(back.replacement.as_deref(), Some("highway/unclassified"));
        assert!(!preset.addable());
    }
}
