//! Theme Preference
//!
//! Light/dark theme persisted under a single `theme` key in a small
//! key-value store (the native stand-in for browser local storage).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Storage key for the theme preference
pub const THEME_KEY: &str = "theme";

/// Dashboard color theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Corrupt store {path:?}: {error}")]
    Corrupt { path: PathBuf, error: String },
}

/// String key-value persistence
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read the saved theme, defaulting to light
///
/// Unreadable stores and unknown values fall back to the default.
pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get_item(THEME_KEY) {
        Ok(Some(value)) => Theme::parse(&value).unwrap_or_else(|| {
            tracing::warn!(value = %value, "Unknown saved theme, using default");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read saved theme");
            Theme::default()
        }
    }
}

pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) -> Result<(), StoreError> {
    store.set_item(THEME_KEY, theme.as_str())
}

/// JSON-object file store
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<data dir>/finboard/storage.json`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|p| p.join("finboard").join("storage.json"))
            .unwrap_or_else(|| PathBuf::from("./finboard_storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    error: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());

        let io_err = |e: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(&items).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            error: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(io_err)
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
