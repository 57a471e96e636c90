use serde::{Deserialize, Serialize};

/// Field definition as it appears in catalog data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Tag key edited by this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Several keys edited together (e.g. an address field)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,

    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Offered on every preset regardless of its tags
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub universal: bool,
}

fn default_field_type() -> String {
    "text".to_string()
}

/// An editable attribute offered alongside presets
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: String,
    pub key: Option<String>,
    pub keys: Vec<String>,
    pub field_type: String,
    pub label: String,
    pub universal: bool,
}

impl Field {
    pub fn from_definition(id: impl Into<String>, def: FieldDefinition) -> Self {
        let id = id.into();
        Self {
            label: def.label.unwrap_or_else(|| id.clone()),
            id,
            key: def.key,
            keys: def.keys,
            field_type: def.field_type,
            universal: def.universal,
        }
    }

    #[must_use]
    pub fn to_definition(&self) -> FieldDefinition {
        FieldDefinition {
            key: self.key.clone(),
            keys: self.keys.clone(),
            field_type: self.field_type.clone(),
            label: Some(self.label.clone()),
            universal: self.universal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_json() {
        let def: FieldDefinition =
            serde_json::from_str(r#"{"key": "email", "type": "email", "universal": true}"#).unwrap();
        let field = Field::from_definition("email", def);
        assert!(field.universal);
        assert_eq!(field.field_type, "email");
        assert_eq!(field.label, "email");
    }

    #[test]
    fn test_field_type_defaults_to_text() {
        let def: FieldDefinition = serde_json::from_str(r#"{"key": "name"}"#).unwrap();
        assert_eq!(def.field_type, "text");
        assert!(!def.universal);
    }
}
