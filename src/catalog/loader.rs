//! Asynchronous loading of catalog data files.
//!
//! Files are addressed by logical name (`preset_presets`, `preset_fields`,
//! ...) and resolved to a location through a file map. Successful loads are
//! cached for the lifetime of the loader. Concurrent requests for the same
//! location share one fetch, and failures are never cached so a later call
//! retries.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::delta::CatalogDelta;
use crate::catalog::embedded::embedded_file;

pub const PRESET_CATEGORIES: &str = "preset_categories";
pub const PRESET_DEFAULTS: &str = "preset_defaults";
pub const PRESET_FIELDS: &str = "preset_fields";
pub const PRESET_PRESETS: &str = "preset_presets";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Unknown data file: {0}")]
    NotFound(String),

    #[error("Data file {0} is empty")]
    EmptyResult(String),

    #[error("Failed to fetch {location}: {message}")]
    FetchError { location: String, message: String },
}

impl LoadError {
    pub fn fetch(location: impl Into<String>, message: impl ToString) -> Self {
        Self::FetchError {
            location: location.into(),
            message: message.to_string(),
        }
    }
}

/// Transport for catalog data files
#[async_trait]
pub trait DataFetcher: Send + Sync {
    /// Fetch and parse the file at `location`.
    ///
    /// `Ok(None)` means the file exists but has no content.
    async fn fetch(&self, location: &str) -> Result<Option<Value>, LoadError>;
}

/// Serves the data files compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedFetcher;

#[async_trait]
impl DataFetcher for EmbeddedFetcher {
    async fn fetch(&self, location: &str) -> Result<Option<Value>, LoadError> {
        let raw = embedded_file(location)
            .ok_or_else(|| LoadError::fetch(location, "no embedded file with this name"))?;
        parse_payload(location, raw)
    }
}

/// Reads data files from a directory
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataFetcher for DirectoryFetcher {
    async fn fetch(&self, location: &str) -> Result<Option<Value>, LoadError> {
        let path = self.root.join(location);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LoadError::fetch(path.display().to_string(), e))?;
        parse_payload(location, &raw)
    }
}

fn parse_payload(location: &str, raw: &str) -> Result<Option<Value>, LoadError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| LoadError::fetch(location, e))
}

/// The standard logical-name to file-name mapping
pub fn default_file_map() -> HashMap<String, String> {
    [PRESET_CATEGORIES, PRESET_DEFAULTS, PRESET_FIELDS, PRESET_PRESETS]
        .into_iter()
        .map(|name| (name.to_string(), format!("{name}.json")))
        .collect()
}

type Outcome = Result<Arc<Value>, LoadError>;

#[derive(Default)]
struct Shared {
    cache: Mutex<HashMap<String, Arc<Value>>>,
    inflight: Mutex<HashMap<String, watch::Receiver<Option<Outcome>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight entry even if the fetch task is aborted
struct InflightGuard {
    shared: Arc<Shared>,
    location: String,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        lock(&self.shared.inflight).remove(&self.location);
    }
}

/// Cached, deduplicating loader for catalog data files
pub struct DataLoader {
    fetcher: Arc<dyn DataFetcher>,
    file_map: HashMap<String, String>,
    shared: Arc<Shared>,
}

impl DataLoader {
    pub fn new(fetcher: impl DataFetcher + 'static) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            file_map: default_file_map(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Loader over the data compiled into the binary
    pub fn embedded() -> Self {
        Self::new(EmbeddedFetcher)
    }

    /// Loader over data files in a directory
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(DirectoryFetcher::new(root))
    }

    /// Replace the logical-name to location mapping
    #[must_use]
    pub fn with_file_map(mut self, file_map: HashMap<String, String>) -> Self {
        self.file_map = file_map;
        self
    }

    pub fn file_map(&self) -> &HashMap<String, String> {
        &self.file_map
    }

    /// Whether a logical name has been loaded successfully
    pub fn is_cached(&self, name: &str) -> bool {
        lock(&self.shared.cache).contains_key(name)
    }

    /// Load a data file by logical name
    pub async fn get(&self, name: &str) -> Result<Arc<Value>, LoadError> {
        if let Some(value) = lock(&self.shared.cache).get(name) {
            return Ok(Arc::clone(value));
        }

        let location = self
            .file_map
            .get(name)
            .ok_or_else(|| LoadError::NotFound(name.to_string()))?;

        let mut rx = self.subscribe(name, location);
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| Err(LoadError::fetch(location.as_str(), "fetch was aborted")))
    }

    /// Join the fetch already running for `location`, or start one
    fn subscribe(&self, name: &str, location: &str) -> watch::Receiver<Option<Outcome>> {
        let mut inflight = lock(&self.shared.inflight);
        if let Some(rx) = inflight.get(location) {
            debug!("Joining in-flight fetch of {}", location);
            return rx.clone();
        }

        let (tx, rx) = watch::channel(None);
        inflight.insert(location.to_string(), rx.clone());
        drop(inflight);

        let fetcher = Arc::clone(&self.fetcher);
        let guard = InflightGuard {
            shared: Arc::clone(&self.shared),
            location: location.to_string(),
        };
        let name = name.to_string();

        tokio::spawn(async move {
            info!("Fetching {} from {}", name, guard.location);
            let outcome = match fetcher.fetch(&guard.location).await {
                Ok(None | Some(Value::Null)) => Err(LoadError::EmptyResult(name.clone())),
                Ok(Some(value)) => Ok(Arc::new(value)),
                Err(e) => Err(e),
            };

            match &outcome {
                Ok(value) => {
                    lock(&guard.shared.cache).insert(name, Arc::clone(value));
                }
                Err(e) => warn!("Loading {} failed: {}", name, e),
            }
            drop(guard);
            tx.send_replace(Some(outcome));
        });

        rx
    }

    /// Load all four catalog files concurrently and assemble a merge delta
    pub async fn load_catalog_delta(&self) -> Result<CatalogDelta, LoadError> {
        let (categories, defaults, presets, fields) = tokio::try_join!(
            self.get(PRESET_CATEGORIES),
            self.get(PRESET_DEFAULTS),
            self.get(PRESET_PRESETS),
            self.get(PRESET_FIELDS),
        )?;
        Ok(CatalogDelta::from_files(
            Value::clone(&categories),
            Value::clone(&defaults),
            Value::clone(&presets),
            Value::clone(&fields),
        ))
    }
}

impl std::fmt::Debug for DataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("file_map", &self.file_map)
            .finish_non_exhaustive()
    }
}
