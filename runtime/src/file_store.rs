//! File-backed key-value store.
//!
//! All entries live in a single JSON object on disk:
//!
//! ```text
//! { "todos": "[{\"id\":1,\"text\":\"Buy milk\",\"done\":false}]" }
//! ```
//!
//! The file is read on every access and rewritten atomically (temp file, then
//! rename) on every change, so two processes sharing a file see each other's
//! writes but never a half-written file. Last writer wins.
//!
//! A file that does not decode is renamed to `<path>.corrupt` and the store
//! carries on empty.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use todolist_core::key_value::{KeyValueError, KeyValueStore};

type Entries = BTreeMap<String, String>;

/// Durable [`KeyValueStore`] backed by a JSON file.
///
/// # Example
///
/// ```no_run
/// use todolist_core::key_value::KeyValueStore;
/// use todolist_runtime::file_store::FileKeyValueStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FileKeyValueStore::new("todolist.json").with_quota(5 * 1024 * 1024);
/// store.set("todos", "[]")?;
/// assert_eq!(store.get("todos")?.as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    quota: Option<u64>,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Create a store over `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota: None,
            lock: Mutex::new(()),
        }
    }

    /// Limit the total size of stored keys and values, in bytes.
    #[must_use]
    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured quota, if any.
    #[must_use]
    pub const fn quota(&self) -> Option<u64> {
        self.quota
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, KeyValueError> {
        self.lock
            .lock()
            .map_err(|_| KeyValueError::Unavailable("file store lock poisoned".to_string()))
    }

    fn load(&self) -> Result<Entries, KeyValueError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => Ok(entries),
                Err(error) => self.set_aside(&error),
            },
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(error) => Err(KeyValueError::Io(format!("{}: {error}", self.path.display()))),
        }
    }

    /// Move an undecodable file to `<path>.corrupt` and start from no entries.
    fn set_aside(&self, error: &serde_json::Error) -> Result<Entries, KeyValueError> {
        let backup = self.backup_path();
        std::fs::rename(&self.path, &backup).map_err(|e| {
            KeyValueError::Corrupt(format!(
                "{}: {error} (could not move it aside: {e})",
                self.path.display()
            ))
        })?;
        tracing::warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            error = %error,
            "Store file was unreadable, moved it aside and started empty"
        );
        Ok(Entries::new())
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    fn save(&self, entries: &Entries) -> Result<(), KeyValueError> {
        let encoded = serde_json::to_string_pretty(entries)
            .map_err(|e| KeyValueError::Io(format!("encoding {}: {e}", self.path.display())))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, encoded).map_err(|e| io_error(&tmp, &e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, &e))?;
        Ok(())
    }
}

fn io_error(path: &Path, error: &std::io::Error) -> KeyValueError {
    KeyValueError::Io(format!("{}: {error}", path.display()))
}

fn stored_bytes(entries: &Entries) -> u64 {
    entries
        .iter()
        .map(|(key, value)| (key.len() + value.len()) as u64)
        .sum()
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        let _guard = self.guard()?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        let _guard = self.guard()?;
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(quota) = self.quota {
            let needed = stored_bytes(&entries);
            if needed > quota {
                return Err(KeyValueError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueError> {
        let _guard = self.guard()?;
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
