//! Best-effort preference store.
//!
//! `load` and `save` never return errors. A missing key, an unreadable
//! backend or a value that does not deserialize all produce the caller's
//! fallback; a failed write is logged and dropped.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, KvBackend, MemoryKv};

/// JSON values over a [`KvBackend`], with a non-throwing contract.
pub struct Preferences {
    backend: Box<dyn KvBackend + Send>,
}

impl Preferences {
    pub fn new(backend: impl KvBackend + Send + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Preferences that only live as long as this value.
    pub fn in_memory() -> Self {
        Self::new(MemoryKv::new())
    }

    /// SQLite store in the data directory, or an in-memory store when the
    /// database cannot be opened.
    pub fn open_default() -> Self {
        match Database::open() {
            Ok(db) => Self::new(db),
            Err(e) => {
                tracing::warn!("preference database unavailable, using memory: {e}");
                Self::in_memory()
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Read and deserialize the value at `key`, or return `fallback`.
    pub fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return fallback,
            Err(e) => {
                tracing::warn!(key, backend = self.backend.name(), "failed to read preference: {e}");
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, "ignoring malformed preference {raw:?}: {e}");
                fallback
            }
        }
    }

    /// Serialize `value` and store it at `key`. Failures are logged only.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, "failed to serialize preference: {e}");
                return;
            }
        };

        if let Err(e) = self.backend.set(key, &raw) {
            tracing::warn!(key, backend = self.backend.name(), "failed to save preference: {e}");
        }
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("backend", &self.backend.name())
            .finish()
    }
}
