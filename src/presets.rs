//! The consumer-facing preset index.
//!
//! [`PresetIndex`] owns a [`PresetCatalog`] and a [`RecencyLedger`] and exposes
//! the operations an editor needs: matching, default lists blended with recent
//! use, field lookup, classification tables and the ledger itself.
//!
//! The index is an ordinary owned value. Hosts that share it across tasks wrap
//! it in [`SharedPresetIndex`], which takes the write lock for every merge so
//! that no reader ever sees a half-rebuilt geometry index.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::catalog::classify::{AreaKeys, TagTable};
use crate::catalog::delta::CatalogDelta;
use crate::catalog::loader::{DataLoader, LoadError};
use crate::catalog::store::PresetCatalog;
use crate::core::field::Field;
use crate::core::preset::Preset;
use crate::core::tags::Tags;
use crate::core::types::{Geometry, PresetId};
use crate::matching::engine::{MatchTarget, MatchingConfig, MatchingEngine, PresetMatch};
use crate::recents::events::{ListenerId, PresetEvent};
use crate::recents::ledger::{RecencyLedger, RibbonItem};
use crate::recents::storage::KeyValueStorage;

/// Number of recent presets blended into a defaults list
pub const RECENT_DEFAULTS: usize = 4;

/// A preset index shared between tasks
pub type SharedPresetIndex = Arc<RwLock<PresetIndex>>;

/// Keep the first occurrence of each preset
fn dedupe<'a>(presets: impl IntoIterator<Item = &'a Preset>) -> Vec<&'a Preset> {
    let mut seen: HashSet<&PresetId> = HashSet::new();
    presets
        .into_iter()
        .filter(|preset| seen.insert(&preset.id))
        .collect()
}

#[derive(Debug)]
pub struct PresetIndex {
    catalog: PresetCatalog,
    recents: RecencyLedger,
    config: MatchingConfig,
    intro_mode: bool,
}

impl PresetIndex {
    /// An index holding only the fallback presets, with recents kept in memory
    pub fn new() -> Self {
        Self::with_catalog(PresetCatalog::new(), RecencyLedger::in_memory())
    }

    pub fn with_catalog(catalog: PresetCatalog, recents: RecencyLedger) -> Self {
        Self {
            catalog,
            recents,
            config: MatchingConfig::default(),
            intro_mode: false,
        }
    }

    /// Persist recents through `storage` instead of memory
    #[must_use]
    pub fn with_storage(mut self, storage: Box<dyn KeyValueStorage>) -> Self {
        self.recents = RecencyLedger::new(storage);
        self
    }

    #[must_use]
    pub fn with_matching_config(mut self, config: MatchingConfig) -> Self {
        self.config = config;
        self
    }

    /// Fetch the base data files and merge them in one step
    pub async fn init(&mut self, loader: &DataLoader) -> Result<&mut Self, LoadError> {
        let delta = loader.load_catalog_delta().await?;
        Ok(self.merge(&delta))
    }

    pub fn merge(&mut self, delta: &CatalogDelta) -> &mut Self {
        self.catalog.merge(delta);
        self.recents.invalidate();
        self
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    /// Matching engine over the current catalog
    pub fn matcher(&self) -> MatchingEngine<'_> {
        MatchingEngine::with_config(&self.catalog, self.config.clone())
    }

    pub fn match_tags(&self, tags: &Tags, geometry: Geometry) -> &Preset {
        self.matcher().match_tags(tags, geometry)
    }

    pub fn find_match(&self, tags: &Tags, geometry: Geometry) -> PresetMatch<'_> {
        self.matcher().find_match(tags, geometry)
    }

    pub fn match_entity<R, E>(&self, entity: &E, resolver: &R) -> &Preset
    where
        R: ?Sized,
        E: MatchTarget<R>,
    {
        self.matcher().match_entity(entity, resolver)
    }

    pub fn allows_vertex<R, E>(&self, entity: &E, resolver: &R) -> bool
    where
        R: ?Sized,
        E: MatchTarget<R>,
    {
        self.matcher().allows_vertex(entity, resolver)
    }

    /// Presets to offer for a new feature of `geometry`, at most `n` long.
    ///
    /// Up to four recently used presets come first, then the static defaults,
    /// and the geometry's fallback preset always closes the list.
    pub fn defaults(&mut self, geometry: Geometry, n: usize) -> Vec<&Preset> {
        let n = n.max(1);
        let catalog = &self.catalog;

        let mut recent: Vec<&Preset> = Vec::new();
        if !self.intro_mode {
            for item in self.recents.get_recents(catalog) {
                if recent.len() == RECENT_DEFAULTS {
                    break;
                }
                let Some(preset) = catalog.get(&item.preset) else {
                    continue;
                };
                if preset.match_geometry(geometry) && !recent.contains(&preset) {
                    recent.push(preset);
                }
            }
        }

        let mut union = dedupe(recent.into_iter().chain(catalog.default_presets(geometry)));
        union.truncate(n - 1);
        union.push(catalog.fallback(geometry));
        dedupe(union)
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.catalog.field(id)
    }

    /// Fields offered on every preset
    pub fn universal(&self) -> Vec<&Field> {
        self.catalog.universal()
    }

    pub fn item(&self, id: &PresetId) -> Option<&Preset> {
        self.catalog.get(id)
    }

    pub fn get_recents(&mut self) -> &[RibbonItem] {
        self.recents.get_recents(&self.catalog)
    }

    /// Unique presets of the ledger, most recent first
    pub fn recent(&mut self) -> Vec<&Preset> {
        let catalog = &self.catalog;
        let presets: Vec<&Preset> = self
            .recents
            .get_recents(catalog)
            .iter()
            .filter_map(|item| catalog.get(&item.preset))
            .collect();
        dedupe(presets)
    }

    /// Record a preset as just used. Ignored in intro mode and for unknown ids.
    pub fn set_most_recent(&mut self, preset: &PresetId, geometry: Geometry) {
        if self.intro_mode {
            debug!("Intro mode: not recording {}", preset);
            return;
        }
        if let Some(preset) = self.catalog.get(preset) {
            self.recents.set_most_recent(&self.catalog, preset, geometry);
        }
    }

    pub fn remove_recent(&mut self, preset: &PresetId, geometry: Geometry) {
        self.recents.remove_recent(&self.catalog, preset, geometry);
    }

    pub fn recent_matching(
        &mut self,
        preset: &PresetId,
        geometry: Geometry,
    ) -> Option<&RibbonItem> {
        self.recents.recent_matching(&self.catalog, preset, geometry)
    }

    pub fn move_recent(&mut self, item: &RibbonItem, before: &RibbonItem) -> bool {
        self.recents.move_recent(&self.catalog, item, before)
    }

    pub fn area_keys(&self) -> AreaKeys {
        self.catalog.area_keys()
    }

    pub fn point_tags(&self) -> &TagTable {
        self.catalog.point_tags()
    }

    pub fn vertex_tags(&self) -> &TagTable {
        self.catalog.vertex_tags()
    }

    pub fn addable_preset_ids(&self) -> Option<&HashSet<PresetId>> {
        self.catalog.addable_preset_ids()
    }

    /// Restrict which presets may be added; `None` allows all.
    ///
    /// The ledger is reloaded on next access so that records for presets
    /// that are no longer addable drop out.
    pub fn set_addable_preset_ids(&mut self, ids: Option<HashSet<PresetId>>) -> &mut Self {
        self.catalog.set_addable_preset_ids(ids);
        self.recents.invalidate();
        self
    }

    pub fn set_intro_mode(&mut self, intro_mode: bool) {
        self.intro_mode = intro_mode;
    }

    pub fn in_intro_mode(&self) -> bool {
        self.intro_mode
    }

    /// Subscribe to ledger changes
    pub fn on_recents_change<F>(&mut self, handler: F) -> ListenerId
    where
        F: Fn(PresetEvent) + Send + Sync + 'static,
    {
        self.recents.on_change(handler)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.recents.off(id)
    }

    /// Wrap the index for sharing between tasks
    pub fn into_shared(self) -> SharedPresetIndex {
        Arc::new(RwLock::new(self))
    }
}

impl Default for PresetIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch the base data files without holding the lock, then merge under it
pub async fn init_shared(
    index: &SharedPresetIndex,
    loader: &DataLoader,
) -> Result<(), LoadError> {
    let delta = loader.load_catalog_delta().await?;
    index.write().await.merge(&delta);
    Ok(())
}
