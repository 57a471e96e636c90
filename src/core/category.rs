use serde::{Deserialize, Serialize};

use crate::core::types::{Geometry, PresetId};

/// Category as it appears in catalog data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "crate::core::preset::deserialize_geometry",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub geometry: Vec<Geometry>,

    #[serde(default)]
    pub members: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A named grouping of presets used in listings; never matched against tags
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: PresetId,
    pub name: String,
    pub geometry: Vec<Geometry>,
    /// Member preset or category ids, in listing order
    pub members: Vec<PresetId>,
    pub icon: Option<String>,
}

impl Category {
    pub fn from_definition(id: impl Into<String>, def: CategoryDefinition) -> Self {
        let id = PresetId::new(id);
        Self {
            name: def.name.unwrap_or_else(|| id.to_string()),
            id,
            geometry: def.geometry,
            members: def.members.into_iter().map(PresetId::new).collect(),
            icon: def.icon,
        }
    }

    #[must_use]
    pub fn to_definition(&self) -> CategoryDefinition {
        CategoryDefinition {
            name: Some(self.name.clone()),
            geometry: self.geometry.clone(),
            members: self.members.iter().map(ToString::to_string).collect(),
            icon: self.icon.clone(),
        }
    }
}
