//! # Todolist Runtime
//!
//! Runtime implementation for the persisted todo list.
//!
//! This crate provides the Store runtime that runs a reducer against state
//! mirrored to durable key-value storage.
//!
//! ## Core Components
//!
//! - **`PersistedState`**: Typed state written through to a `KeyValueStore`
//! - **Store**: The runtime that applies actions and commits persisted state
//! - **`FileKeyValueStore`**: Durable JSON-file storage backend
//!
//! ## Example
//!
//! ```ignore
//! use todolist_runtime::{persisted::InitialValue, Store};
//!
//! let store = Store::open(
//!     my_reducer,
//!     environment,
//!     storage,
//!     "todos",
//!     InitialValue::Value(initial_state),
//! )?;
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field.clone()).await;
//! ```

/// Typed state mirrored to durable key-value storage
pub mod persisted;

/// File-backed key-value storage
pub mod file_store;

/// Metric names and registration
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use crate::persisted::PersistError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Persisted state could not be loaded or written
        ///
        /// When a write fails the action is not committed and the
        /// previous state stays in place.
        #[error("Persistence failed: {0}")]
        Persistence(#[from] PersistError),
    }
}

pub use error::StoreError;
pub use file_store::FileKeyValueStore;
pub use persisted::{InitialValue, LoadOutcome, PersistError, PersistedState};

/// Store module - The runtime for reducers
pub mod store {
    use super::StoreError;
    use crate::metrics::STORE_ACTIONS_TOTAL;
    use crate::persisted::{InitialValue, LoadOutcome, PersistedState};
    use serde::{de::DeserializeOwned, Serialize};
    use std::sync::Arc;
    use todolist_core::{effect::Effect, key_value::KeyValueStore, reducer::Reducer};
    use tokio::sync::RwLock;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (a [`PersistedState`] behind `RwLock`)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (committing state through `Effect::Persist`)
    ///
    /// Actions are applied one at a time: each runs to completion, including
    /// its durable write, before the next one sees the state.
    ///
    /// Cloning a Store is cheap and yields a handle to the same state.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::open(
    ///     TodoReducer::new(),
    ///     TodoEnvironment::new(),
    ///     storage,
    ///     "todos",
    ///     InitialValue::lazy(TodoState::starter),
    /// )?;
    ///
    /// store.send(TodoAction::Add { text: Some("Buy milk".into()) }).await?;
    /// ```
    pub struct Store<R>
    where
        R: Reducer,
    {
        state: Arc<RwLock<PersistedState<R::State>>>,
        reducer: Arc<R>,
        environment: Arc<R::Environment>,
    }

    impl<R> Store<R>
    where
        R: Reducer + Send + Sync + 'static,
        R::State: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
        R::Action: Send + 'static,
        R::Environment: Send + Sync + 'static,
    {
        /// Open a store whose state is persisted under `key` in `storage`
        ///
        /// # Arguments
        ///
        /// - `reducer`: The reducer implementation (business logic)
        /// - `environment`: Injected dependencies
        /// - `storage`: Durable key-value store the state is mirrored to
        /// - `key`: Storage key for the state
        /// - `initial`: State to start from when nothing usable is stored
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Persistence`] if storage cannot be read or
        /// the initial state cannot be written.
        pub fn open(
            reducer: R,
            environment: R::Environment,
            storage: Arc<dyn KeyValueStore>,
            key: impl Into<String>,
            initial: InitialValue<R::State>,
        ) -> Result<Self, StoreError> {
            let persisted = PersistedState::create(storage, key, initial)?;
            tracing::debug!(
                key = %persisted.key(),
                outcome = ?persisted.load_outcome(),
                "Opened store"
            );

            Ok(Self {
                state: Arc::new(RwLock::new(persisted)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
            })
        }

        /// Send an action to the store
        ///
        /// The reducer runs against a copy of the current state. If it
        /// returns [`Effect::Persist`], the copy is written to storage and
        /// becomes the new state; otherwise it is dropped.
        ///
        /// # Returns
        ///
        /// `true` if the action was committed, `false` if it left the
        /// state untouched.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Persistence`] if the durable write fails.
        /// The previous state is kept in that case.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: R::Action) -> Result<bool, StoreError> {
            let mut persisted = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let mut next = persisted.value().clone();
            let effects = {
                let _span = tracing::debug_span!("reducer_execution").entered();
                self.reducer.reduce(&mut next, action, &self.environment)
            };
            tracing::trace!("Reducer completed, returned {} effects", effects.len());

            let commit = effects.iter().any(Effect::is_persist);
            if commit {
                persisted.set(next)?;
                tracing::debug!(key = %persisted.key(), "Committed action");
            } else {
                tracing::debug!("Action left state unchanged");
            }

            crate::metrics::counter!(STORE_ACTIONS_TOTAL, "committed" => commit.to_string())
                .increment(1);
            Ok(commit)
        }

        /// Read the current state through a projection function
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&R::State) -> T,
        {
            let persisted = self.state.read().await;
            f(persisted.value())
        }

        /// The storage key the state is persisted under
        pub async fn key(&self) -> String {
            self.state.read().await.key().to_string()
        }

        /// How the state was obtained when the store was opened
        pub async fn load_outcome(&self) -> LoadOutcome {
            self.state.read().await.load_outcome().clone()
        }

        /// Move the persisted state to a new storage key
        ///
        /// The entry under the old key is removed, not copied.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Persistence`] if the migration fails.
        #[tracing::instrument(skip(self, key), name = "store_set_key")]
        pub async fn set_key(&self, key: impl Into<String>) -> Result<(), StoreError> {
            self.state.write().await.set_key(key)?;
            Ok(())
        }
    }

    impl<R> Clone for Store<R>
    where
        R: Reducer,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
            }
        }
    }

}

pub use store::Store;
