use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::catalog::store::PresetCatalog;
use crate::core::preset::Preset;
use crate::core::types::{Geometry, PresetId, RibbonSource};
use crate::recents::events::{ListenerId, Listeners, PresetEvent};
use crate::recents::storage::{KeyValueStorage, MemoryStorage};

/// Maximum number of items kept in the ledger
pub const MAX_RECENTS: usize = 30;

/// Storage key holding the minified ledger
pub const RECENTS_STORAGE_KEY: &str = "preset_recents";

/// A preset used for a geometry, as shown in the recently-used ribbon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RibbonItem {
    pub preset: PresetId,
    pub geometry: Geometry,
    pub source: RibbonSource,
}

/// Persisted form of a ribbon item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinifiedItem {
    #[serde(rename = "pID")]
    pub preset_id: String,
    #[serde(rename = "geom")]
    pub geometry: String,
}

impl RibbonItem {
    pub fn recent(preset: PresetId, geometry: Geometry) -> Self {
        Self {
            preset,
            geometry: geometry.fallback_geometry(),
            source: RibbonSource::Recent,
        }
    }

    pub fn is_recent(&self) -> bool {
        self.source == RibbonSource::Recent
    }

    /// Whether this item records `preset` under `geometry`, after normalization
    pub fn matches(&self, preset: &PresetId, geometry: Geometry) -> bool {
        self.preset == *preset && self.geometry == geometry.fallback_geometry()
    }

    pub fn minified(&self) -> MinifiedItem {
        MinifiedItem {
            preset_id: self.preset.to_string(),
            geometry: self.geometry.as_str().to_string(),
        }
    }
}

/// Rebuild a ribbon item against the current catalog, dropping stale records
fn rehydrate(catalog: &PresetCatalog, item: &MinifiedItem) -> Option<RibbonItem> {
    let preset = catalog.get(&PresetId::new(item.preset_id.as_str()))?;
    let geometry = Geometry::parse(&item.geometry)?.fallback_geometry();

    let supported = preset.match_geometry(geometry)
        || (geometry == Geometry::Point && preset.match_geometry(Geometry::Vertex));
    if !supported || !preset.addable() {
        return None;
    }
    Some(RibbonItem::recent(preset.id.clone(), geometry))
}

/// Most-recently-used presets, newest first, persisted after every change.
///
/// The ledger loads lazily from storage on first access. Records whose preset
/// is gone, not addable, or no longer supports the recorded geometry are
/// dropped at that point.
pub struct RecencyLedger {
    items: Option<Vec<RibbonItem>>,
    storage: Box<dyn KeyValueStorage>,
    listeners: Listeners,
}

impl RecencyLedger {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self {
            items: None,
            storage,
            listeners: Listeners::new(),
        }
    }

    /// Ledger backed by volatile storage
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    fn load(&self, catalog: &PresetCatalog) -> Vec<RibbonItem> {
        let raw = match self.storage.get(RECENTS_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Could not read recent presets: {}", e);
                return Vec::new();
            }
        };

        let records: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Discarding unreadable recent presets: {}", e);
                return Vec::new();
            }
        };

        let mut items: Vec<RibbonItem> = Vec::new();
        let rehydrated = records
            .into_iter()
            .filter_map(|record| serde_json::from_value::<MinifiedItem>(record).ok())
            .filter_map(|record| rehydrate(catalog, &record));
        for item in rehydrated {
            // point and vertex records fold into one pair
            if items.iter().any(|i| i.matches(&item.preset, item.geometry)) {
                continue;
            }
            items.push(item);
            if items.len() == MAX_RECENTS {
                break;
            }
        }
        debug!("Loaded {} recent presets", items.len());
        items
    }

    fn items_mut(&mut self, catalog: &PresetCatalog) -> &mut Vec<RibbonItem> {
        if self.items.is_none() {
            self.items = Some(self.load(catalog));
        }
        self.items.get_or_insert_with(Vec::new)
    }

    /// Persist the ledger and notify listeners
    fn commit(&mut self) {
        let minified: Vec<MinifiedItem> = self
            .items
            .iter()
            .flatten()
            .map(RibbonItem::minified)
            .collect();

        match serde_json::to_string(&minified) {
            Ok(json) => {
                if let Err(e) = self.storage.set(RECENTS_STORAGE_KEY, &json) {
                    warn!("Could not save recent presets: {}", e);
                }
            }
            Err(e) => warn!("Could not encode recent presets: {}", e),
        }
        self.listeners.emit(PresetEvent::RecentsChange);
    }

    /// Current ledger, newest first
    pub fn get_recents(&mut self, catalog: &PresetCatalog) -> &[RibbonItem] {
        self.items_mut(catalog)
    }

    /// Record `preset` as just used for `geometry`.
    ///
    /// Non-searchable presets are ignored. An existing record for the same
    /// pair moves to the front instead of being duplicated.
    pub fn set_most_recent(
        &mut self,
        catalog: &PresetCatalog,
        preset: &Preset,
        geometry: Geometry,
    ) {
        if !preset.searchable {
            return;
        }
        let items = self.items_mut(catalog);
        items.retain(|item| !item.matches(&preset.id, geometry));
        items.insert(0, RibbonItem::recent(preset.id.clone(), geometry));
        items.truncate(MAX_RECENTS);
        self.commit();
    }

    /// Drop the record for a preset and geometry, if present
    pub fn remove_recent(
        &mut self,
        catalog: &PresetCatalog,
        preset: &PresetId,
        geometry: Geometry,
    ) {
        let items = self.items_mut(catalog);
        let Some(pos) = items.iter().position(|item| item.matches(preset, geometry)) else {
            return;
        };
        items.remove(pos);
        self.commit();
    }

    pub fn recent_matching(
        &mut self,
        catalog: &PresetCatalog,
        preset: &PresetId,
        geometry: Geometry,
    ) -> Option<&RibbonItem> {
        self.items_mut(catalog)
            .iter()
            .find(|item| item.matches(preset, geometry))
    }

    /// Move `item` so it sits immediately before `before`.
    ///
    /// Returns false, leaving the ledger untouched, when either item is absent
    /// or both are the same record.
    pub fn move_recent(
        &mut self,
        catalog: &PresetCatalog,
        item: &RibbonItem,
        before: &RibbonItem,
    ) -> bool {
        let items = self.items_mut(catalog);
        let find = |items: &[RibbonItem], target: &RibbonItem| {
            items
                .iter()
                .position(|i| i.matches(&target.preset, target.geometry))
        };

        let from = find(items.as_slice(), item);
        let to = find(items.as_slice(), before);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        if from == to {
            return false;
        }

        let moved = items.remove(from);
        let to = if from < to { to - 1 } else { to };
        items.insert(to, moved);
        self.commit();
        true
    }

    /// Forget the loaded ledger so the next access reloads from storage
    pub fn invalidate(&mut self) {
        self.items = None;
    }

    pub fn on_change<F>(&mut self, handler: F) -> ListenerId
    where
        F: Fn(PresetEvent) + Send + Sync + 'static,
    {
        self.listeners.on(PresetEvent::RecentsChange, handler)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.off(id)
    }
}

impl fmt::Debug for RecencyLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyLedger")
            .field("items", &self.items)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
