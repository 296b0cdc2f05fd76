// Key-value settings persistence.
//
// Durable storage behind the credential store: a single JSON object at
// `~/.wikivault/settings.json`. Abstracted as a trait so tests (and the
// desktop shell, which has its own preference storage) can substitute an
// in-memory implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

/// Settings key holding all providers' credential fields.
pub const USER_INFOS_KEY: &str = "userInfos";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not determine home directory")]
    NoHomeDirectory,
}

/// A durable key-value store for JSON documents.
pub trait SettingsStore: Send + Sync + 'static {
    /// Read a value. Missing keys and unreadable storage resolve to `None`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value.
    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError>;

    /// Remove every stored key.
    fn clear(&self) -> Result<(), SettingsError>;
}

/// Root directory for wikivault global state: `~/.wikivault/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wikivault"))
}

/// Path to the settings file: `~/.wikivault/settings.json`.
pub fn settings_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("settings.json"))
}

/// File-backed settings store. The whole document is re-read on every get
/// and rewritten on every set; the credential store's coalescing queue
/// keeps write volume low.
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    /// Store at the default location. Fails only when the home directory
    /// cannot be resolved.
    pub fn new() -> Result<Self, SettingsError> {
        settings_path().map(|path| Self { path }).ok_or(SettingsError::NoHomeDirectory)
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> BTreeMap<String, Value> {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    fn write_document(&self, document: &BTreeMap<String, Value>) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(document)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.read_document().remove(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut document = self.read_document();
        document.insert(key.to_string(), value);
        self.write_document(&document)
    }

    fn clear(&self) -> Result<(), SettingsError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SettingsError::Io(error)),
        }
    }
}

/// In-memory settings store for tests.
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, Value>>,
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().expect("settings lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.values.lock().expect("settings lock poisoned").insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&self) -> Result<(), SettingsError> {
        self.values.lock().expect("settings lock poisoned").clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_roundtrips_values() {
        let temp = TempDir::new().expect("tempdir");
        let store = JsonFileSettings::at_path(temp.path().join("settings.json"));

        assert_eq!(store.get(USER_INFOS_KEY), None);

        store
            .set(USER_INFOS_KEY, serde_json::json!({ "providers": {} }))
            .expect("set should succeed");
        assert_eq!(store.get(USER_INFOS_KEY), Some(serde_json::json!({ "providers": {} })));
    }

    #[test]
    fn file_store_tolerates_corrupt_document() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("settings.json");
        std::fs::write(&path, "{not json").expect("seed file");

        let store = JsonFileSettings::at_path(&path);
        assert_eq!(store.get(USER_INFOS_KEY), None);

        // Writing replaces the corrupt document.
        store.set("other", Value::from(1)).expect("set should succeed");
        assert_eq!(store.get("other"), Some(Value::from(1)));
    }

    #[test]
    fn clear_removes_the_file() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("settings.json");
        let store = JsonFileSettings::at_path(&path);

        store.set("a", Value::from("b")).expect("set should succeed");
        store.clear().expect("clear should succeed");
        assert!(!path.exists());

        // Clearing again is a no-op, not an error.
        store.clear().expect("second clear should succeed");
    }
}
