//! Settings store
//!
//! Boolean key-value persistence for the feature flags. Reads default to
//! `false`; every write goes straight to the backing store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use fos_a11y::{Feature, FeatureFlags};

/// Settings persistence error
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value store the controller persists flags through
pub trait SettingsStore {
    fn get_bool(&self, key: &str, default: bool) -> bool;

    /// Persist synchronously
    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError>;
}

/// Read every feature flag, missing keys off
pub fn load_flags<S: SettingsStore + ?Sized>(store: &S) -> FeatureFlags {
    let mut flags = FeatureFlags::default();
    for feature in Feature::ALL {
        flags.set(feature, store.get_bool(feature.key(), false));
    }
    flags
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON object on disk, rewritten on every set
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, bool>,
}

impl JsonFileStore {
    /// Open `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| SettingsError::Json {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        tracing::debug!("loaded {} setting(s) from {}", values.len(), path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(&self.values).map_err(|source| SettingsError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsStore for JsonFileStore {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}
