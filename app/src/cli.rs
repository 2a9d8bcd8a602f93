//! Command-line interface for the todo list.
//!
//! Each invocation opens the store, applies at most one command and prints
//! the resulting list.

use crate::view;
use crate::{TodoAction, TodoId, TodoStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;
use todolist_runtime::StoreError;

/// Errors from running a command
#[derive(Error, Debug)]
pub enum CommandError {
    /// The store could not persist the change
    #[error(transparent)]
    Store(#[from] StoreError),

    /// `add` was given empty text without `--allow-empty`
    #[error("todo text must not be empty (pass --allow-empty to add it anyway)")]
    EmptyText,

    /// `toggle` target is neither a number nor a `todo-<id>` element id
    #[error("not a todo id: {0}")]
    InvalidTarget(String),
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(
    name = "todolist",
    version = env!("CARGO_PKG_VERSION"),
    about = "A todo list that remembers its items between runs."
)]
pub struct Cli {
    /// JSON file backing the store (overrides TODOLIST_STORE_PATH).
    #[clap(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,
    /// Storage key for the list (overrides TODOLIST_STORAGE_KEY).
    #[clap(long, global = true)]
    pub key: Option<String>,
    /// Start from an empty list instead of the placeholder item when nothing is stored.
    #[clap(long, global = true)]
    pub empty_default: bool,
    /// Print Prometheus metrics for this run after the command.
    #[clap(long, global = true)]
    pub metrics: bool,
    /// Command to run (defaults to `list`)
    #[clap(subcommand)]
    pub command: Option<Command>,
}

/// Todo list commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show all todos.
    List,
    /// Add a todo.
    Add {
        /// Todo text (positional argument)
        #[clap(value_name = "TEXT")]
        text: String,
        /// Accept empty text.
        #[clap(long)]
        allow_empty: bool,
    },
    /// Flip a todo between done and not done.
    Toggle {
        /// Numeric id or element id such as `todo-2`
        #[clap(value_name = "ID")]
        target: String,
    },
    /// Mark every todo done.
    CompleteAll,
    /// Move the list to another storage key, dropping the old entry.
    RenameKey {
        /// New storage key
        #[clap(value_name = "KEY")]
        key: String,
    },
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the list was changed and written
    pub changed: bool,
    /// Text to print
    pub output: String,
}

/// Resolve a `toggle` argument: a bare id or an element id.
///
/// # Errors
///
/// Returns [`CommandError::InvalidTarget`] if neither form parses.
pub fn parse_target(target: &str) -> Result<TodoId, CommandError> {
    target
        .parse()
        .ok()
        .map(TodoId::new)
        .or_else(|| view::parse_element_id(target))
        .ok_or_else(|| CommandError::InvalidTarget(target.to_string()))
}

/// Run one command against the store.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the change cannot be
/// persisted.
pub async fn execute(command: Command, store: &TodoStore) -> Result<CommandOutcome, CommandError> {
    let changed = match command {
        Command::List => false,
        Command::Add { text, allow_empty } => {
            if text.trim().is_empty() && !allow_empty {
                return Err(CommandError::EmptyText);
            }
            store.send(TodoAction::Add { text: Some(text) }).await?
        },
        Command::Toggle { target } => {
            let id = parse_target(&target)?;
            let changed = store.send(TodoAction::Toggle { id }).await?;
            if !changed {
                tracing::info!(%id, "No todo with that id");
            }
            changed
        },
        Command::CompleteAll => store.send(TodoAction::CompleteAll).await?,
        Command::RenameKey { key } => {
            if store.key().await == key {
                false
            } else {
                store.set_key(key).await?;
                true
            }
        },
    };

    let output = store
        .state(|state| format!("{}{}\n", view::render(state), view::summary(state)))
        .await;

    Ok(CommandOutcome { changed, output })
}
