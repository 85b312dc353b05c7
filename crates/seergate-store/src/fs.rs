//! JSON-file implementation of the `DocumentStore` port.
//!
//! One file per named store inside a single data directory. Corrupt and
//! missing files both read as absent, so a damaged save never blocks a
//! boot.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use seergate_core::error::GateError;
use seergate_core::store::DocumentStore;

/// File-backed document store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The default per-user data directory.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("seergate")
    }

    /// The directory this store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, store: &str) -> PathBuf {
        self.dir.join(format!("{store}.json"))
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, store: &str) -> Option<serde_json::Value> {
        let path = self.path_for(store);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(store, error = %err, "document read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(err) => {
                tracing::warn!(store, error = %err, "document corrupt, treating as absent");
                None
            }
        }
    }

    fn save(&self, store: &str, doc: &serde_json::Value) -> Result<(), GateError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| GateError::Infrastructure(format!("data dir create failed: {e}")))?;
        let bytes = serde_json::to_vec_pretty(doc)?;
        fs::write(self.path_for(store), bytes)
            .map_err(|e| GateError::Infrastructure(format!("document write failed: {e}")))
    }

    fn clear(&self, store: &str) {
        if let Err(err) = fs::remove_file(self.path_for(store))
            && err.kind() != ErrorKind::NotFound
        {
            tracing::warn!(store, error = %err, "document remove failed");
        }
    }
}
