mod config;
pub mod database;
pub mod memory;
pub mod preferences;

pub use config::{Config, NotificationsConfig, StorageConfig, UiConfig};
pub use database::Database;
pub use memory::MemoryKv;
pub use preferences::Preferences;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StorageError;

/// Raw string key-value storage.
///
/// Implementations may fail; [`Preferences`] turns every failure into a
/// fallback value or a log line so the engine never sees an error.
pub trait KvBackend {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Get the value stored at `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KvBackend + ?Sized> KvBackend for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Returns the Sprout data directory, creating it if needed.
///
/// Resolution order:
/// 1. `SPROUT_DATA_DIR` when set
/// 2. `~/.config/sprout-dev/` when `SPROUT_ENV=dev`
/// 3. `~/.config/sprout/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("SPROUT_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SPROUT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("sprout-dev")
            } else {
                base_dir.join("sprout")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
