use std::collections::{BTreeMap, HashMap};

use crate::core::preset::Preset;
use crate::core::types::{Geometry, PresetId};

/// Index content resolved to preset ids
pub type IndexSnapshot = BTreeMap<Geometry, BTreeMap<String, Vec<PresetId>>>;

/// Inverted index from (geometry, tag key) to candidate presets.
///
/// Entries are positions in the catalog's preset list, in catalog order. The
/// index is always rebuilt from scratch; it is never patched in place.
#[derive(Debug, Clone, Default)]
pub struct GeometryIndex {
    by_geometry: HashMap<Geometry, HashMap<String, Vec<usize>>>,
}

impl GeometryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        let mut by_geometry = HashMap::new();
        for geometry in Geometry::ALL {
            by_geometry.insert(geometry, HashMap::new());
        }
        Self { by_geometry }
    }

    /// Build an index by scanning every preset
    pub fn build(presets: &[Preset]) -> Self {
        let mut index = Self::new();
        for (idx, preset) in presets.iter().enumerate() {
            for geometry in &preset.geometry {
                let keys = index.by_geometry.entry(*geometry).or_default();
                for key in preset.tags.keys() {
                    keys.entry(key.to_string()).or_default().push(idx);
                }
            }
        }
        index
    }

    /// Candidate presets for a geometry, keyed by tag key
    pub fn candidates(&self, geometry: Geometry) -> Option<&HashMap<String, Vec<usize>>> {
        self.by_geometry.get(&geometry)
    }

    /// Candidate presets for a single (geometry, key) pair
    pub fn get(&self, geometry: Geometry, key: &str) -> &[usize] {
        self.by_geometry
            .get(&geometry)
            .and_then(|keys| keys.get(key))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Number of (geometry, key) entries
    pub fn len(&self) -> usize {
        self.by_geometry.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the index into preset ids, in a stable order for comparison
    pub fn snapshot(&self, presets: &[Preset]) -> IndexSnapshot {
        self.by_geometry
            .iter()
            .map(|(geometry, keys)| {
                let keys = keys
                    .iter()
                    .map(|(key, indices)| {
                        let ids = indices.iter().map(|&i| presets[i].id.clone()).collect();
                        (key.clone(), ids)
                    })
                    .collect();
                (*geometry, keys)
            })
            .collect()
    }
}
