use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::core::types::{Geometry, PresetId};

/// A batch of catalog changes.
///
/// Each section maps ids to raw JSON definitions. A `null` value removes the
/// entry; any other value adds or replaces it. Sections keep document order,
/// which becomes catalog order for newly added entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Map<String, Value>>,

    /// Geometry name -> ordered list of default preset ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Map<String, Value>>,
}

fn section_of(name: &str, blob: Value) -> Option<Map<String, Value>> {
    match blob {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            warn!(
                section = name,
                kind = json_kind(&other),
                "Ignoring catalog section that is not an object"
            );
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl CatalogDelta {
    /// Create an empty delta
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a delta from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Assemble a delta from the four catalog data files
    pub fn from_files(categories: Value, defaults: Value, presets: Value, fields: Value) -> Self {
        Self {
            fields: section_of("fields", fields),
            presets: section_of("presets", presets),
            categories: section_of("categories", categories),
            defaults: section_of("defaults", defaults),
        }
    }

    #[must_use]
    pub fn with_preset(mut self, id: impl Into<String>, definition: Value) -> Self {
        self.presets
            .get_or_insert_with(Map::new)
            .insert(id.into(), definition);
        self
    }

    #[must_use]
    pub fn remove_preset(self, id: impl Into<String>) -> Self {
        self.with_preset(id, Value::Null)
    }

    #[must_use]
    pub fn with_field(mut self, id: impl Into<String>, definition: Value) -> Self {
        self.fields
            .get_or_insert_with(Map::new)
            .insert(id.into(), definition);
        self
    }

    #[must_use]
    pub fn remove_field(self, id: impl Into<String>) -> Self {
        self.with_field(id, Value::Null)
    }

    #[must_use]
    pub fn with_category(mut self, id: impl Into<String>, definition: Value) -> Self {
        self.categories
            .get_or_insert_with(Map::new)
            .insert(id.into(), definition);
        self
    }

    #[must_use]
    pub fn remove_category(self, id: impl Into<String>) -> Self {
        self.with_category(id, Value::Null)
    }

    #[must_use]
    pub fn with_defaults<I, S>(mut self, geometry: Geometry, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = ids.into_iter().map(|id| Value::String(id.into())).collect();
        self.defaults
            .get_or_insert_with(Map::new)
            .insert(geometry.as_str().to_string(), Value::Array(list));
        self
    }

    #[must_use]
    pub fn remove_defaults(mut self, geometry: Geometry) -> Self {
        self.defaults
            .get_or_insert_with(Map::new)
            .insert(geometry.as_str().to_string(), Value::Null);
        self
    }

    /// True when no section is present
    pub fn is_empty(&self) -> bool {
        self.fields.is_none()
            && self.presets.is_none()
            && self.categories.is_none()
            && self.defaults.is_none()
    }
}

/// Default preset ids listed for a geometry; `None` means remove the list
pub(crate) fn default_ids(value: &Value) -> Option<Vec<PresetId>> {
    value.as_array().map(|ids| {
        ids.iter()
            .filter_map(Value::as_str)
            .map(PresetId::new)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_marks_removals_as_null() {
        let delta = CatalogDelta::new()
            .with_preset("shop", json!({"geometry": ["point"], "tags": {"shop": "*"}}))
            .remove_preset("amenity/cafe")
            .remove_defaults(Geometry::Line);

        let presets = delta.presets.as_ref().unwrap();
        assert!(presets["shop"].is_object());
        assert!(presets["amenity/cafe"].is_null());
        assert!(delta.defaults.as_ref().unwrap()["line"].is_null());
        assert!(delta.fields.is_none());
    }

    #[test]
    fn test_from_json_keeps_document_order() {
        let delta = CatalogDelta::from_json(
            r#"{"presets": {"z": {"geometry": ["point"], "tags": {"z": "*"}}, "a": {"geometry": ["point"], "tags": {"a": "*"}}}}"#,
        )
        .unwrap();
        let ids: Vec<_> = delta.presets.unwrap().keys().cloned().collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn test_from_files_drops_non_object_sections() {
        let delta = CatalogDelta::from_files(json!([]), json!({"point": ["shop"]}), json!(null), json!({}));
        assert!(delta.categories.is_none());
        assert!(delta.presets.is_none());
        assert!(delta.defaults.is_some());
        assert!(delta.fields.is_some());
    }

    #[test]
    fn test_default_ids() {
        assert_eq!(
            default_ids(&json!(["a", 3, "b"])),
            Some(vec![PresetId::new("a"), PresetId::new("b")])
        );
        assert_eq!(default_ids(&json!("a")), None);
    }
}
