//! # Todolist Testing
//!
//! Testing utilities and helpers for the persisted todo list.
//!
//! This crate provides:
//! - In-memory implementations of the `KeyValueStore` capability
//! - A fault-injecting store for exercising storage failures
//! - The [`ReducerTest`] Given-When-Then harness
//! - Tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use todolist_testing::InMemoryKeyValueStore;
//! use todolist_runtime::{InitialValue, Store};
//!
//! #[tokio::test]
//! async fn test_add_flow() {
//!     let storage = Arc::new(InMemoryKeyValueStore::new());
//!     let store = Store::open(TodoReducer::new(), TodoEnvironment::new(), storage.clone(), "todos", InitialValue::default())?;
//!
//!     store.send(TodoAction::Add { text: Some("Buy milk".into()) }).await?;
//!
//!     assert!(storage.contains("todos")?);
//! }
//! ```

use todolist_core::key_value::{KeyValueError, KeyValueStore};

/// Ergonomic Given-When-Then testing for reducers
pub mod reducer_test;

/// Mock implementations of storage capabilities
pub mod mocks {
    use super::{KeyValueError, KeyValueStore};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::RwLock;

    /// In-memory key-value store for fast, deterministic tests
    ///
    /// Stands in for browser-style local storage or the file-backed store.
    /// Also counts successful writes so tests can assert on persistence
    /// behaviour.
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_core::key_value::KeyValueStore;
    /// use todolist_testing::InMemoryKeyValueStore;
    ///
    /// let store = InMemoryKeyValueStore::new();
    /// store.set("todos", "[]").unwrap();
    /// assert_eq!(store.get("todos").unwrap().as_deref(), Some("[]"));
    /// assert_eq!(store.write_count(), 1);
    /// ```
    #[derive(Debug, Default)]
    pub struct InMemoryKeyValueStore {
        data: RwLock<HashMap<String, String>>,
        writes: AtomicUsize,
    }

    impl InMemoryKeyValueStore {
        /// Create a new empty in-memory store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store pre-populated with entries
        #[must_use]
        pub fn with_entries<I, K, V>(entries: I) -> Self
        where
            I: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<String>,
        {
            Self {
                data: RwLock::new(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into()))
                        .collect(),
                ),
                writes: AtomicUsize::new(0),
            }
        }

        /// Number of stored entries
        #[must_use]
        pub fn len(&self) -> usize {
            self.data.read().map_or(0, |data| data.len())
        }

        /// Check if the store is empty
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// All stored keys, sorted
        #[must_use]
        pub fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self
                .data
                .read()
                .map(|data| data.keys().cloned().collect())
                .unwrap_or_default();
            keys.sort();
            keys
        }

        /// Number of successful `set` calls so far
        #[must_use]
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    fn poisoned() -> KeyValueError {
        KeyValueError::Unavailable("in-memory store lock poisoned".to_string())
    }

    impl KeyValueStore for InMemoryKeyValueStore {
        fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
            Ok(self.data.read().map_err(|_| poisoned())?.get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
            self.data
                .write()
                .map_err(|_| poisoned())?
                .insert(key.to_string(), value.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), KeyValueError> {
            self.data.write().map_err(|_| poisoned())?.remove(key);
            Ok(())
        }
    }

    /// In-memory store whose operations can be made to fail on demand
    ///
    /// Failed writes report [`KeyValueError::QuotaExceeded`], the failure a
    /// full local storage area produces.
    #[derive(Debug, Default)]
    pub struct FailingKeyValueStore {
        inner: InMemoryKeyValueStore,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        fail_removes: AtomicBool,
        failing_keys: RwLock<HashSet<String>>,
    }

    impl FailingKeyValueStore {
        /// Create a store that succeeds until told otherwise
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `get` fail
        pub fn fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }

        /// Make `set` fail
        ///
        /// Turning failures off also clears any keys passed to
        /// [`fail_writes_to`](Self::fail_writes_to).
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
            if !fail {
                if let Ok(mut keys) = self.failing_keys.write() {
                    keys.clear();
                }
            }
        }

        /// Make `set` fail for one key only
        pub fn fail_writes_to(&self, key: impl Into<String>) {
            if let Ok(mut keys) = self.failing_keys.write() {
                keys.insert(key.into());
            }
        }

        fn write_fails(&self, key: &str) -> bool {
            self.fail_writes.load(Ordering::SeqCst)
                || self
                    .failing_keys
                    .read()
                    .is_ok_and(|keys| keys.contains(key))
        }

        /// Make `remove` fail
        pub fn fail_removes(&self, fail: bool) {
            self.fail_removes.store(fail, Ordering::SeqCst);
        }

        /// The underlying in-memory store
        #[must_use]
        pub const fn inner(&self) -> &InMemoryKeyValueStore {
            &self.inner
        }
    }

    impl KeyValueStore for FailingKeyValueStore {
        fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(KeyValueError::Io(format!("injected read failure for {key}")));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
            if self.write_fails(key) {
                return Err(KeyValueError::QuotaExceeded {
                    key: key.to_string(),
                    needed: value.len() as u64,
                    quota: 0,
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), KeyValueError> {
            if self.fail_removes.load(Ordering::SeqCst) {
                return Err(KeyValueError::Io(format!("injected remove failure for {key}")));
            }
            self.inner.remove(key)
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a tracing subscriber that writes through the test harness
    ///
    /// Honours `RUST_LOG`. Safe to call from every test; only the first call
    /// installs anything.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::init_test_tracing;
pub use mocks::{FailingKeyValueStore, InMemoryKeyValueStore};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store_basics() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.is_empty());

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.write_count(), 2);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_with_entries_prepopulates() {
        let store = InMemoryKeyValueStore::with_entries([("b", "2"), ("a", "1")]);
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_failing_store_injects_errors() {
        let store = FailingKeyValueStore::new();
        store.set("k", "v").unwrap();

        store.fail_writes(true);
        assert!(matches!(
            store.set("k", "w"),
            Err(KeyValueError::QuotaExceeded { .. })
        ));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.fail_reads(true);
        assert!(store.get("k").is_err());

        store.fail_removes(true);
        assert!(store.remove("k").is_err());
        assert_eq!(store.inner().len(), 1);
    }

    #[test]
    fn test_failing_store_scopes_write_failures_to_a_key() {
        let store = FailingKeyValueStore::new();
        store.fail_writes_to("blocked");

        assert!(store.set("blocked", "v").is_err());
        store.set("open", "v").unwrap();

        store.fail_writes(false);
        store.set("blocked", "v").unwrap();
        assert_eq!(store.inner().keys(), vec!["blocked".to_string(), "open".to_string()]);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
