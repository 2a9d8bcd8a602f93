//! Key-value storage abstraction for persisted state.
//!
//! This module defines the capability that persisted state is mirrored to: a
//! durable store mapping string keys to string values, in the spirit of a
//! browser's `localStorage`.
//!
//! # Design
//!
//! The store deals in raw strings only. Encoding values (JSON) is the job of
//! the layer above it, which keeps the storage contract free of any
//! serialization format.
//!
//! Access is synchronous and local. Implementations take `&self` and use
//! interior mutability so one store can be shared behind an
//! `Arc<dyn KeyValueStore>`.
//!
//! # Implementations
//!
//! - `FileKeyValueStore` (in `todolist-runtime`): durable JSON file on disk
//! - `InMemoryKeyValueStore` (in `todolist-testing`): fast, deterministic testing
//!
//! # Example
//!
//! ```
//! use todolist_core::key_value::{KeyValueError, KeyValueStore};
//!
//! fn rename<S: KeyValueStore + ?Sized>(store: &S, from: &str, to: &str) -> Result<(), KeyValueError> {
//!     if let Some(value) = store.get(from)? {
//!         store.set(to, &value)?;
//!         store.remove(from)?;
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Errors that can occur during key-value store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyValueError {
    /// Writing the entry would push the store past its size quota.
    #[error("Quota exceeded writing {key}: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded {
        /// Key that was being written.
        key: String,
        /// Total bytes the store would hold after the write.
        needed: u64,
        /// Maximum bytes the store may hold.
        quota: u64,
    },

    /// The store cannot be reached (for example a poisoned lock).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// The backing medium holds data the store cannot read.
    #[error("Corrupt storage: {0}")]
    Corrupt(String),
}

/// Durable, string-keyed key-value store.
///
/// Semantics follow `localStorage`:
///
/// - `get` of a missing key is `Ok(None)`, not an error
/// - `set` overwrites any existing value
/// - `remove` of a missing key succeeds
///
/// There is no cross-instance coordination: two writers on the same key
/// simply overwrite each other.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`KeyValueError::QuotaExceeded`] if the write does not fit,
    /// or another error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError>;

    /// Delete the entry under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), KeyValueError>;

    /// Check if an entry exists under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn contains(&self, key: &str) -> Result<bool, KeyValueError> {
        Ok(self.get(key)?.is_some())
    }
}
