//! Typed state mirrored to a durable key-value store.
//!
//! [`PersistedState`] behaves like an ordinary owned value, except that every
//! replacement is also written (as JSON) under a string key in a
//! [`KeyValueStore`], so the value survives process restarts.
//!
//! # Lifecycle
//!
//! 1. [`PersistedState::create`] reads the entry under the key. A usable entry
//!    becomes the initial value; otherwise the [`InitialValue`] is resolved.
//! 2. The initial value is written back under the key straight away.
//! 3. Each [`set`](PersistedState::set) / [`update`](PersistedState::update)
//!    writes the new value, then replaces the held one.
//! 4. [`set_key`](PersistedState::set_key) migrates to a new key: the old
//!    entry is removed, not copied.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use todolist_core::key_value::KeyValueStore;
//! use todolist_runtime::persisted::{InitialValue, PersistedState};
//! use todolist_testing::InMemoryKeyValueStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(InMemoryKeyValueStore::new());
//! let mut visits = PersistedState::create(storage.clone(), "visits", InitialValue::Value(0_u32))?;
//!
//! visits.update(|n| n + 1)?;
//! assert_eq!(storage.get("visits")?.as_deref(), Some("1"));
//! # Ok(())
//! # }
//! ```

use crate::metrics::{RECOVERIES_TOTAL, REMOVALS_TOTAL, WRITES_TOTAL};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use todolist_core::key_value::{KeyValueError, KeyValueStore};

/// Errors from persisted state operations.
#[derive(Error, Debug)]
pub enum PersistError {
    /// The key-value store rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(#[from] KeyValueError),

    /// The value could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Factory producing a lazily computed initial value.
type Factory<T> = Box<dyn FnOnce() -> T + Send>;

/// Initial value used when nothing usable is stored yet.
///
/// Resolved at most once, during [`PersistedState::create`].
pub enum InitialValue<T> {
    /// Use this value as is.
    Value(T),
    /// Call this to compute the value.
    Factory(Factory<T>),
}

impl<T> InitialValue<T> {
    /// Build a lazily computed initial value.
    #[must_use]
    pub fn lazy<F>(factory: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self::Factory(Box::new(factory))
    }

    /// Produce the value, running the factory if there is one.
    #[must_use]
    pub fn resolve(self) -> T {
        match self {
            Self::Value(value) => value,
            Self::Factory(factory) => factory(),
        }
    }
}

impl<T: Default + 'static> Default for InitialValue<T> {
    fn default() -> Self {
        Self::lazy(T::default)
    }
}

impl<T> From<T> for InitialValue<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for InitialValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("InitialValue::Value").field(value).finish(),
            Self::Factory(_) => write!(f, "InitialValue::Factory(<fn>)"),
        }
    }
}

/// How the initial value of a [`PersistedState`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Decoded from the stored entry.
    Restored,
    /// Nothing was stored; the initial value was used.
    Defaulted,
    /// The stored entry could not be decoded; the initial value was used instead.
    Recovered {
        /// Decoder error for the discarded entry.
        error: String,
    },
}

impl LoadOutcome {
    /// Whether a corrupt entry was discarded.
    #[must_use]
    pub const fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}

/// A value mirrored to a [`KeyValueStore`] under a string key.
pub struct PersistedState<T> {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    value: T,
    outcome: LoadOutcome,
}

impl<T> PersistedState<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Load the value stored under `key`, falling back to `initial`.
    ///
    /// A missing or empty entry resolves `initial`. An entry that fails to
    /// decode also resolves `initial`; the failure is logged and reported
    /// through [`load_outcome`](Self::load_outcome) rather than returned.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] if the store cannot be read, or if
    /// the initial write-back fails.
    pub fn create(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        initial: InitialValue<T>,
    ) -> Result<Self, PersistError> {
        let key = key.into();

        let (value, outcome) = match storage.get(&key)? {
            Some(raw) if !raw.is_empty() => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    tracing::debug!(key = %key, "Restored persisted state");
                    (value, LoadOutcome::Restored)
                },
                Err(error) => {
                    tracing::warn!(
                        key = %key,
                        error = %error,
                        "Discarding unreadable persisted state, using initial value"
                    );
                    metrics::counter!(RECOVERIES_TOTAL).increment(1);
                    (
                        initial.resolve(),
                        LoadOutcome::Recovered {
                            error: error.to_string(),
                        },
                    )
                },
            },
            _ => {
                tracing::debug!(key = %key, "No persisted state, using initial value");
                (initial.resolve(), LoadOutcome::Defaulted)
            },
        };

        write(storage.as_ref(), &key, &value)?;

        Ok(Self {
            storage,
            key,
            value,
            outcome,
        })
    }

    /// Replace the value, writing it under the current key.
    ///
    /// The held value only changes if the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded or stored.
    pub fn set(&mut self, value: T) -> Result<(), PersistError> {
        write(self.storage.as_ref(), &self.key, &value)?;
        self.value = value;
        Ok(())
    }

    /// Replace the value with one computed from the current value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded or stored.
    pub fn update<F>(&mut self, f: F) -> Result<(), PersistError>
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next)
    }

    /// Move the value to a new key.
    ///
    /// The entry under the previous key is removed first, then the current
    /// value is written under `key`. The old entry is discarded, not copied.
    /// Passing the current key does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the old entry cannot be removed or the new one
    /// cannot be written. On error the key is left unchanged, and if the new
    /// entry could not be written the value is written back under the old key.
    pub fn set_key(&mut self, key: impl Into<String>) -> Result<(), PersistError> {
        let key = key.into();
        if key == self.key {
            return Ok(());
        }

        self.storage.remove(&self.key)?;
        metrics::counter!(REMOVALS_TOTAL).increment(1);
        if let Err(error) = write(self.storage.as_ref(), &key, &self.value) {
            tracing::warn!(
                from = %self.key,
                to = %key,
                error = %error,
                "Key migration failed, restoring entry under previous key"
            );
            if let Err(restore) = write(self.storage.as_ref(), &self.key, &self.value) {
                tracing::error!(
                    key = %self.key,
                    error = %restore,
                    "Could not restore persisted state under previous key"
                );
            }
            return Err(error);
        }

        tracing::info!(from = %self.key, to = %key, "Migrated persisted state to new key");
        self.key = key;
        Ok(())
    }
}

impl<T> PersistedState<T> {
    /// The current value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// The key the value is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// How the initial value was obtained.
    #[must_use]
    pub const fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// Take the value out, leaving storage as it is.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistedState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedState")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

fn write<T: Serialize>(storage: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), PersistError> {
    let encoded = serde_json::to_string(value)?;
    storage.set(key, &encoded)?;
    metrics::counter!(WRITES_TOTAL).increment(1);
    tracing::trace!(key = %key, bytes = encoded.len(), "Wrote persisted state");
    Ok(())
}
