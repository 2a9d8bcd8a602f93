//! Domain types for the todo list.
//!
//! A todo list is an ordered sequence of items. Items are added at the end,
//! toggled between done and not done, and never removed. The whole sequence
//! is what gets persisted, as a bare JSON array:
//!
//! ```text
//! [{"id":1,"text":"Buy milk","done":true},{"id":2,"text":"Walk dog","done":false}]
//! ```

use serde::{Deserialize, Serialize};

/// Identifier of a todo item
///
/// Ids are 1-based and assigned as the list length plus one at creation.
/// Since items are never removed, that keeps them unique within a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates a `TodoId` from its numeric value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Identifier
    pub id: TodoId,
    /// Description; may be absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Whether the item is completed
    pub done: bool,
}

impl TodoItem {
    /// Creates a new, not yet completed item
    #[must_use]
    pub const fn new(id: TodoId, text: Option<String>) -> Self {
        Self {
            id,
            text,
            done: false,
        }
    }

    /// Text to display, empty when absent
    #[must_use]
    pub fn label(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// State of the todo list
///
/// Insertion order is display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoState {
    items: Vec<TodoItem>,
}

impl TodoState {
    /// Creates a new empty todo list
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates a todo list from existing items
    #[must_use]
    pub const fn from_items(items: Vec<TodoItem>) -> Self {
        Self { items }
    }

    /// The list a first run starts with: a single placeholder item
    #[must_use]
    pub fn starter() -> Self {
        Self::from_items(vec![TodoItem::new(
            TodoId::new(1),
            Some("Dummy Text".to_string()),
        )])
    }

    /// All items in display order
    #[must_use]
    pub fn list(&self) -> &[TodoItem] {
        &self.items
    }

    /// Mutable access to the items, for reducers working on a copy
    pub(crate) fn items_mut(&mut self) -> &mut Vec<TodoItem> {
        &mut self.items
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|t| t.done).count()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Id the next added item receives
    #[must_use]
    pub fn next_id(&self) -> TodoId {
        TodoId::new(self.items.len() as u64 + 1)
    }
}

/// Actions accepted by the todo list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Append a new item
    Add {
        /// Text of the item; not validated
        text: Option<String>,
    },

    /// Flip the completion of one item
    Toggle {
        /// Item to toggle
        id: TodoId,
    },

    /// Mark every item completed
    CompleteAll,
}

impl TodoAction {
    /// Shorthand for adding an item with text
    #[must_use]
    pub fn add(text: impl Into<String>) -> Self {
        Self::Add {
            text: Some(text.into()),
        }
    }

    /// Shorthand for toggling an item by numeric id
    #[must_use]
    pub const fn toggle(id: u64) -> Self {
        Self::Toggle { id: TodoId::new(id) }
    }
}
