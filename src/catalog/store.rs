use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::classify::NodeTables;
use crate::catalog::delta::{default_ids, CatalogDelta};
use crate::catalog::index::{GeometryIndex, IndexSnapshot};
use crate::core::category::{Category, CategoryDefinition};
use crate::core::field::{Field, FieldDefinition};
use crate::core::preset::{Preset, PresetDefinition};
use crate::core::types::{Geometry, PresetId};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format: a merge delta plus version metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub delta: CatalogDelta,
}

/// Items stored in catalog order with lookup by id
#[derive(Debug, Clone)]
struct Entries<T> {
    items: Vec<T>,
    positions: HashMap<String, usize>,
}

impl<T> Entries<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Replace in place, or append when the id is new
    fn upsert(&mut self, id: &str, item: T) {
        if let Some(&idx) = self.positions.get(id) {
            self.items[idx] = item;
        } else {
            self.positions.insert(id.to_string(), self.items.len());
            self.items.push(item);
        }
    }

    fn remove(&mut self, id: &str) -> Option<T> {
        let idx = self.positions.remove(id)?;
        let item = self.items.remove(idx);
        for pos in self.positions.values_mut() {
            if *pos > idx {
                *pos -= 1;
            }
        }
        Some(item)
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.positions.get(id).map(|&idx| &self.items[idx])
    }
}

/// The four built-in fallback presets, kept as a last resort for lookups
#[derive(Debug, Clone)]
struct Fallbacks {
    point: Preset,
    line: Preset,
    area: Preset,
    relation: Preset,
}

impl Fallbacks {
    fn new() -> Self {
        Self {
            point: Preset::fallback(Geometry::Point),
            line: Preset::fallback(Geometry::Line),
            area: Preset::fallback(Geometry::Area),
            relation: Preset::fallback(Geometry::Relation),
        }
    }

    fn for_geometry(&self, geometry: Geometry) -> &Preset {
        match geometry {
            Geometry::Point | Geometry::Vertex => &self.point,
            Geometry::Line => &self.line,
            Geometry::Area => &self.area,
            Geometry::Relation => &self.relation,
        }
    }

    fn all(&self) -> [&Preset; 4] {
        [&self.point, &self.line, &self.area, &self.relation]
    }
}

/// A preset or category from the flattened catalog collection
#[derive(Debug, Clone, Copy)]
pub enum CollectionItem<'a> {
    Preset(&'a Preset),
    Category(&'a Category),
}

impl CollectionItem<'_> {
    pub fn id(&self) -> &PresetId {
        match self {
            Self::Preset(p) => &p.id,
            Self::Category(c) => &c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Preset(p) => &p.name,
            Self::Category(c) => &c.name,
        }
    }
}

/// The preset catalog: presets, fields, categories, per-geometry defaults,
/// and the geometry index derived from them
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: Entries<Preset>,
    fields: Entries<Field>,
    categories: Entries<Category>,
    defaults: HashMap<Geometry, Vec<PresetId>>,

    /// Ids of fields flagged universal, in catalog order
    universal: Vec<String>,

    /// When set, only these presets are addable
    addable_ids: Option<HashSet<PresetId>>,

    index: GeometryIndex,
    node_tables: NodeTables,
    fallbacks: Fallbacks,
}

impl PresetCatalog {
    /// Create a catalog holding only the fallback presets
    pub fn new() -> Self {
        let fallbacks = Fallbacks::new();
        let mut presets = Entries::new();
        for preset in fallbacks.all() {
            presets.upsert(preset.id.as_str(), preset.clone());
        }

        let defaults = Geometry::ALL
            .into_iter()
            .map(|g| (g, vec![g.fallback_id()]))
            .collect();

        let index = GeometryIndex::build(&presets.items);
        let node_tables = NodeTables::build(&presets.items);

        Self {
            presets,
            fields: Entries::new(),
            categories: Entries::new(),
            defaults,
            universal: Vec::new(),
            addable_ids: None,
            index,
            node_tables,
            fallbacks,
        }
    }

    /// Load the catalog compiled into the binary
    pub fn load_embedded() -> Result<Self, CatalogError> {
        let delta = crate::catalog::embedded::embedded_delta()?;
        let mut catalog = Self::new();
        catalog.merge(&delta);
        Ok(catalog)
    }

    /// Load catalog from a JSON file in merge-delta form
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if let Some(version) = data.version.as_deref() {
            if version != CATALOG_VERSION {
                warn!(
                    expected = CATALOG_VERSION,
                    found = version,
                    "Catalog version mismatch"
                );
            }
        }

        let mut catalog = Self::new();
        catalog.merge(&data.delta);
        Ok(catalog)
    }

    /// Apply a batch of additions, replacements and removals.
    ///
    /// Malformed entries are logged and skipped. Fallback presets are never
    /// removed. Derived state (universal fields, resolved preset fields, the
    /// geometry index) is rebuilt from scratch afterwards.
    pub fn merge(&mut self, delta: &CatalogDelta) -> &mut Self {
        if let Some(fields) = &delta.fields {
            self.merge_fields(fields);
        }
        if let Some(presets) = &delta.presets {
            self.merge_presets(presets);
        }
        if let Some(categories) = &delta.categories {
            self.merge_categories(categories);
        }
        if let Some(defaults) = &delta.defaults {
            self.merge_defaults(defaults);
        }

        self.universal = self
            .fields
            .items
            .iter()
            .filter(|f| f.universal)
            .map(|f| f.id.clone())
            .collect();

        for preset in &mut self.presets.items {
            preset.reset_fields();
        }

        self.index = GeometryIndex::build(&self.presets.items);
        self.node_tables = NodeTables::build(&self.presets.items);

        debug!(
            presets = self.presets.items.len(),
            fields = self.fields.items.len(),
            categories = self.categories.items.len(),
            index_entries = self.index.len(),
            "Merged catalog delta"
        );

        self
    }

    fn merge_fields(&mut self, fields: &Map<String, Value>) {
        for (id, value) in fields {
            if value.is_null() {
                self.fields.remove(id);
                continue;
            }
            match FieldDefinition::deserialize(value) {
                Ok(def) => self.fields.upsert(id, Field::from_definition(id, def)),
                Err(e) => warn!(field = %id, error = %e, "Ignoring malformed field"),
            }
        }
    }

    fn merge_presets(&mut self, presets: &Map<String, Value>) {
        for (id, value) in presets {
            if value.is_null() {
                match self.presets.get(id) {
                    Some(existing) if existing.is_fallback() => {
                        debug!(preset = %id, "Refusing to remove fallback preset");
                    }
                    Some(_) => {
                        self.presets.remove(id);
                    }
                    None => {}
                }
                continue;
            }
            match PresetDefinition::deserialize(value) {
                Ok(def) => {
                    let addable = self.is_addable_id(id);
                    self.presets
                        .upsert(id, Preset::from_definition(id.as_str(), def, addable));
                }
                Err(e) => warn!(preset = %id, error = %e, "Ignoring malformed preset"),
            }
        }
    }

    fn merge_categories(&mut self, categories: &Map<String, Value>) {
        for (id, value) in categories {
            if value.is_null() {
                self.categories.remove(id);
                continue;
            }
            match CategoryDefinition::deserialize(value) {
                Ok(def) => self
                    .categories
                    .upsert(id, Category::from_definition(id.as_str(), def)),
                Err(e) => warn!(category = %id, error = %e, "Ignoring malformed category"),
            }
        }
    }

    fn merge_defaults(&mut self, defaults: &Map<String, Value>) {
        for (name, value) in defaults {
            let Some(geometry) = Geometry::parse(name) else {
                debug!(geometry = %name, "Ignoring defaults for unknown geometry");
                continue;
            };
            match default_ids(value) {
                Some(ids) => {
                    let ids = ids
                        .into_iter()
                        .filter(|id| self.presets.get(id.as_str()).is_some())
                        .collect();
                    self.defaults.insert(geometry, ids);
                }
                None => {
                    self.defaults.remove(&geometry);
                }
            }
        }
    }

    fn is_addable_id(&self, id: &str) -> bool {
        self.addable_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&PresetId::new(id)))
    }

    /// Restrict which presets are addable; `None` makes every preset addable
    pub fn set_addable_preset_ids(&mut self, ids: Option<HashSet<PresetId>>) -> &mut Self {
        self.addable_ids = ids;
        for idx in 0..self.presets.items.len() {
            let addable = self.is_addable_id(self.presets.items[idx].id.as_str());
            self.presets.items[idx].set_addable(addable);
        }
        self
    }

    pub fn addable_preset_ids(&self) -> Option<&HashSet<PresetId>> {
        self.addable_ids.as_ref()
    }

    /// Get a preset by ID
    pub fn get(&self, id: &PresetId) -> Option<&Preset> {
        self.presets.get(id.as_str())
    }

    /// Get a preset or category by ID
    pub fn item(&self, id: &PresetId) -> Option<CollectionItem<'_>> {
        self.get(id).map(CollectionItem::Preset).or_else(|| {
            self.categories
                .get(id.as_str())
                .map(CollectionItem::Category)
        })
    }

    /// All presets, in catalog order
    pub fn presets(&self) -> &[Preset] {
        &self.presets.items
    }

    /// All categories, in catalog order
    pub fn categories(&self) -> &[Category] {
        &self.categories.items
    }

    /// Presets followed by categories
    pub fn collection(&self) -> impl Iterator<Item = CollectionItem<'_>> {
        self.presets
            .items
            .iter()
            .map(CollectionItem::Preset)
            .chain(self.categories.items.iter().map(CollectionItem::Category))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields.items
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.get(id)
    }

    /// Fields offered on every preset
    pub fn universal(&self) -> Vec<&Field> {
        self.universal
            .iter()
            .filter_map(|id| self.fields.get(id))
            .collect()
    }

    /// The catch-all preset for a geometry
    pub fn fallback(&self, geometry: Geometry) -> &Preset {
        let builtin = self.fallbacks.for_geometry(geometry);
        self.presets.get(builtin.id.as_str()).unwrap_or(builtin)
    }

    /// Static default presets for a geometry
    pub fn default_presets(&self, geometry: Geometry) -> Vec<&Preset> {
        self.defaults
            .get(&geometry)
            .map(|ids| ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }

    /// Fields of a preset, inherited from its parent when it declares none
    pub fn preset_fields(&self, id: &PresetId) -> Vec<&Field> {
        let Some(preset) = self.get(id) else {
            return Vec::new();
        };
        preset
            .resolved_fields_cell()
            .get_or_init(|| self.resolve_field_ids(preset, |p| &p.fields))
            .iter()
            .filter_map(|f| self.field(f))
            .collect()
    }

    /// Secondary fields of a preset, inherited like [`Self::preset_fields`]
    pub fn preset_more_fields(&self, id: &PresetId) -> Vec<&Field> {
        let Some(preset) = self.get(id) else {
            return Vec::new();
        };
        preset
            .resolved_more_fields_cell()
            .get_or_init(|| self.resolve_field_ids(preset, |p| &p.more_fields))
            .iter()
            .filter_map(|f| self.field(f))
            .collect()
    }

    fn resolve_field_ids(
        &self,
        preset: &Preset,
        select: fn(&Preset) -> &Vec<String>,
    ) -> Vec<String> {
        let mut current = Some(preset);
        while let Some(p) = current {
            let ids = select(p);
            if !ids.is_empty() {
                return ids
                    .iter()
                    .filter(|id| self.fields.get(id).is_some())
                    .cloned()
                    .collect();
            }
            current = p.id.parent().and_then(|parent| self.get(&parent));
        }
        Vec::new()
    }

    pub fn node_tables(&self) -> &NodeTables {
        &self.node_tables
    }

    pub fn index(&self) -> &GeometryIndex {
        &self.index
    }

    /// Geometry index content resolved to preset ids
    pub fn index_snapshot(&self) -> IndexSnapshot {
        self.index.snapshot(&self.presets.items)
    }

    /// Export catalog to JSON in merge-delta form
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let mut delta = CatalogDelta::new();
        for field in &self.fields.items {
            let value = serde_json::to_value(field.to_definition())?;
            delta = delta.with_field(field.id.clone(), value);
        }
        for preset in &self.presets.items {
            let value = serde_json::to_value(preset.to_definition())?;
            delta = delta.with_preset(preset.id.to_string(), value);
        }
        for category in &self.categories.items {
            let value = serde_json::to_value(category.to_definition())?;
            delta = delta.with_category(category.id.to_string(), value);
        }
        for geometry in Geometry::ALL {
            if let Some(ids) = self.defaults.get(&geometry) {
                delta = delta.with_defaults(geometry, ids.iter().map(ToString::to_string));
            }
        }

        let data = CatalogData {
            version: Some(CATALOG_VERSION.to_string()),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            delta,
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of presets in catalog
    pub fn len(&self) -> usize {
        self.presets.items.len()
    }

    /// Check if catalog holds nothing beyond the fallback presets
    pub fn is_empty(&self) -> bool {
        self.presets.items.iter().all(Preset::is_fallback)
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shop_delta() -> CatalogDelta {
        CatalogDelta::new()
            .with_field("name", json!({"key": "name", "type": "localized"}))
            .with_field("email", json!({"key": "email", "type": "email", "universal": true}))
            .with_preset(
                "shop",
                json!({"name": "Shop", "geometry": ["point", "area"], "tags": {"shop": "*"}, "fields": ["name"]}),
            )
            .with_preset(
                "shop/bakery",
                json!({"name": "Bakery", "geometry": ["point", "area"], "tags": {"shop": "bakery"}}),
            )
            .with_category(
                "category-shop",
                json!({"name": "Shops", "geometry": ["point"], "members": ["shop", "shop/bakery"]}),
            )
            .with_defaults(Geometry::Point, ["shop/bakery", "missing", "point"])
    }

    #[test]
    fn test_new_catalog_has_fallbacks() {
        let catalog = PresetCatalog::new();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.is_empty());
        assert_eq!(catalog.fallback(Geometry::Vertex).id.as_str(), "point");
        assert_eq!(catalog.default_presets(Geometry::Line)[0].id.as_str(), "line");
        assert_eq!(catalog.index().get(Geometry::Area, "area").len(), 1);
    }

    #[test]
    fn test_load_embedded_catalog() {
        let catalog = PresetCatalog::load_embedded().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.get(&PresetId::new("amenity/cafe")).is_some());
        assert!(!catalog.universal().is_empty());
    }

    #[test]
    fn test_merge_adds_presets_fields_categories() {
        let mut catalog = PresetCatalog::new();
        catalog.merge(&shop_delta());

        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.get(&PresetId::new("shop/bakery")).unwrap().name, "Bakery");
        assert_eq!(catalog.universal().len(), 1);
        assert_eq!(catalog.universal()[0].id, "email");
        assert_eq!(catalog.categories().len(), 1);
        assert_eq!(catalog.collection().count(), 7);
        assert!(matches!(
            catalog.item(&PresetId::new("category-shop")),
            Some(CollectionItem::Category(_))
        ));

        let defaults: Vec<_> = catalog
            .default_presets(Geometry::Point)
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(defaults, vec!["shop/bakery", "point"]);
    }

    #[test]
    fn test_merge_replaces_in_place() {
        let mut catalog = PresetCatalog::new();
        catalog.merge(&shop_delta());
        catalog.merge(&CatalogDelta::new().with_preset(
            "shop",
            json!({"name": "Store", "geometry": ["point"], "tags": {"shop": "*"}}),
        ));

        assert_eq!(catalog.presets()[4].name, "Store");
        assert_eq!(catalog.presets()[5].id.as_str(), "shop/bakery");
        assert_eq!(catalog.index().get(Geometry::Area, "shop"), &[5]);
    }

    #[test]
    fn test_merge_removes_but_keeps_fallbacks() {
        let mut catalog = PresetCatalog::new();
        catalog.merge(&shop_delta());
        catalog.merge(
            &CatalogDelta::new()
                .remove_preset("shop")
                .remove_preset("point")
                .remove_field("email")
                .remove_category("category-shop"),
        );

        assert!(catalog.get(&PresetId::new("shop")).is_none());
        assert!(catalog.get(&PresetId::new("point")).is_some());
        assert!(catalog.universal().is_empty());
        assert!(catalog.categories().is_empty());

        let snapshot = catalog.index_snapshot();
        assert_eq!(
            snapshot[&Geometry::Point]["shop"],
            vec![PresetId::new("shop/bakery")]
        );
    }

    #[test]
    fn test_merge_ignores_malformed_entries() {
        let mut catalog = PresetCatalog::new();
        catalog.merge(
            &CatalogDelta::new()
                .with_preset("broken", json!({"geometry": "point"}))
                .with_preset("fine", json!({"geometry": ["point"], "tags": {"fine": "yes"}}))
                .with_field("bad", json!(42))
                .with_defaults(Geometry::Line, ["fine"]),
        );
        let mut delta = CatalogDelta::new();
        delta.defaults = Some(
            json!({"spaceship": ["fine"], "area": "not-a-list"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        catalog.merge(&delta);

        assert!(catalog.get(&PresetId::new("broken")).is_none());
        assert!(catalog.get(&PresetId::new("fine")).is_some());
        assert!(catalog.field("bad").is_none());
        assert!(catalog.default_presets(Geometry::Area).is_empty());
        assert_eq!(catalog.default_presets(Geometry::Line)[0].id.as_str(), "fine");
    }

    #[test]
    fn test_addable_preset_ids() {
        let mut catalog = PresetCatalog::new();
        catalog.merge(&shop_delta());
        catalog.set_addable_preset_ids(Some([PresetId::new("shop")].into_iter().collect()));

        assert!(catalog.get(&PresetId::new("shop")).unwrap().addable());
        assert!(!catalog.get(&PresetId::new("shop/bakery")).unwrap().addable());

        // presets added later honour the current restriction
        catalog.merge(&CatalogDelta::new().with_preset(
            "shop/butcher",
            json!({"geometry": ["point"], "tags": {"shop": "butcher"}}),
        ));
        assert!(!catalog.get(&PresetId::new("shop/butcher")).unwrap().addable());

        catalog.set_addable_preset_ids(None);
        assert!(catalog.presets().iter().all(Preset::addable));
    }

    #[test]
    fn test_preset_fields_inherit_from_parent() {
        let mut catalog = PresetCatalog::new();
        catalog.merge(&shop_delta());

        let fields = catalog.preset_fields(&PresetId::new("shop/bakery"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].id, "name");

        // a merge clears cached resolution
        catalog.merge(&CatalogDelta::new().remove_field("name"));
        assert!(catalog.preset_fields(&PresetId::new("shop/bakery")).is_empty());
    }

    #[test]
    fn test_to_json_round_trip() {
        let mut catalog = PresetCatalog::new();
        catalog.merge(&shop_delta());
        let json = catalog.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"created_at\""));

        let reloaded = PresetCatalog::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), catalog.len());
        assert_eq!(reloaded.index_snapshot(), catalog.index_snapshot());
        assert_eq!(reloaded.universal().len(), 1);
    }
}
