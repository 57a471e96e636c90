//! Recently-used presets.
//!
//! The ledger is a bounded, newest-first list of `(preset, geometry)` pairs
//! persisted through a [`KeyValueStorage`] in a minified `{pID, geom}` form.

pub mod events;
pub mod ledger;
pub mod storage;

pub use events::{ListenerId, PresetEvent};
pub use ledger::{RecencyLedger, RibbonItem, MAX_RECENTS, RECENTS_STORAGE_KEY};
pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage, StorageError};
