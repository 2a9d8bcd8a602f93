//! A todo list whose items survive restarts.
//!
//! The list is an ordered sequence of items that can be added, toggled and
//! all marked complete. It lives in a [`Store`](todolist_runtime::Store)
//! whose state is mirrored, as a JSON array, under a single key of a durable
//! key-value store.
//!
//! - [`types`]: items, the list and its actions
//! - [`reducer`]: the rules for changing the list
//! - [`view`]: rows for rendering and element-id parsing
//! - [`config`]: environment-driven settings
//! - [`cli`]: the command-line front end
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use todolist::{open_store, TodoAction, TodoState};
//! use todolist_runtime::InitialValue;
//! use todolist_testing::InMemoryKeyValueStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(InMemoryKeyValueStore::new());
//! let store = open_store(storage, "todos", InitialValue::Value(TodoState::new()))?;
//!
//! store.send(TodoAction::add("Buy milk")).await?;
//! store.send(TodoAction::toggle(1)).await?;
//!
//! let state = store.state(Clone::clone).await;
//! assert_eq!(state.completed_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod reducer;
pub mod types;
pub mod view;

use std::sync::Arc;
use todolist_core::key_value::KeyValueStore;
use todolist_runtime::{InitialValue, Store, StoreError};

// Re-export commonly used types
pub use config::{Config, DEFAULT_STORAGE_KEY};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{TodoAction, TodoId, TodoItem, TodoState};

/// Store running the todo reducer
pub type TodoStore = Store<TodoReducer>;

/// Open the todo list persisted under `key` in `storage`.
///
/// # Errors
///
/// Returns [`StoreError`] if storage cannot be read or the initial list
/// cannot be written back.
pub fn open_store(
    storage: Arc<dyn KeyValueStore>,
    key: impl Into<String>,
    initial: InitialValue<TodoState>,
) -> Result<TodoStore, StoreError> {
    Store::open(
        TodoReducer::new(),
        TodoEnvironment::new(),
        storage,
        key,
        initial,
    )
}
