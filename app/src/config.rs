//! Configuration management for the todo list.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Command-line flags are applied on top by the binary.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use todolist_core::key_value::KeyValueStore;
use todolist_runtime::FileKeyValueStore;

/// Storage key the list lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Default quota, matching the usual 5 MiB browser local storage allowance.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Durable storage configuration
    pub storage: StorageConfig,
    /// Log level used when `RUST_LOG` does not parse (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Durable storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Path of the JSON file backing the key-value store
    pub path: PathBuf,
    /// Key the todo list is stored under
    pub key: String,
    /// Maximum bytes the store may hold (`None` = unlimited)
    pub quota_bytes: Option<u64>,
}

impl StorageConfig {
    /// Open the configured key-value store.
    #[must_use]
    pub fn open(&self) -> Arc<dyn KeyValueStore> {
        let store = FileKeyValueStore::new(&self.path);
        match self.quota_bytes {
            Some(quota) => Arc::new(store.with_quota(quota)),
            None => Arc::new(store),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `TODOLIST_STORE_PATH` (default `todolist.json`)
    /// - `TODOLIST_STORAGE_KEY` (default `todos`)
    /// - `TODOLIST_STORAGE_QUOTA_BYTES` (default 5 MiB, `0` disables the quota)
    /// - `RUST_LOG` (default `info`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let quota = lookup("TODOLIST_STORAGE_QUOTA_BYTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_QUOTA_BYTES);

        Self {
            storage: StorageConfig {
                path: lookup("TODOLIST_STORE_PATH")
                    .map_or_else(|| PathBuf::from("todolist.json"), PathBuf::from),
                key: lookup("TODOLIST_STORAGE_KEY")
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
                quota_bytes: (quota > 0).then_some(quota),
            },
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Replace the storage path.
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.path = path.into();
        self
    }

    /// Replace the storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage.key = key.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
