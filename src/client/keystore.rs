//! Locally persisted API key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::KeyStoreError;

/// Name the key is stored under.
pub const STORAGE_KEY: &str = "mock_server_api_key";

/// Key used when nothing has been saved.
pub const DEFAULT_API_KEY: &str = "mock-server-admin";

/// JSON file holding the API key under [`STORAGE_KEY`]. Other entries in
/// the file are preserved on save.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored key, or `None` when the file or entry is missing.
    pub fn load(&self) -> Result<Option<String>, KeyStoreError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(STORAGE_KEY)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_string))
    }

    /// Stored key, falling back to [`DEFAULT_API_KEY`].
    pub fn load_or_default(&self) -> Result<String, KeyStoreError> {
        Ok(self.load()?.unwrap_or_else(|| {
            debug!(path = %self.path.display(), "No saved API key, using default");
            DEFAULT_API_KEY.to_string()
        }))
    }

    /// Persist `key`.
    pub fn save(&self, key: &str) -> Result<(), KeyStoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(STORAGE_KEY.to_string(), Value::String(key.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&Value::Object(entries))?)?;

        info!(path = %self.path.display(), "API key saved");
        Ok(())
    }

    fn read_entries(&self) -> Result<Map<String, Value>, KeyStoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        Ok(serde_json::from_slice(&raw)?)
    }
}
