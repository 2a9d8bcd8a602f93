//! View data for rendering the todo list.
//!
//! A renderer needs one row per item and a way back from an input element to
//! the item it stands for. Elements are identified as `todo-<id>`; the id is
//! recovered by splitting at the first `-`.

use crate::types::{TodoId, TodoItem, TodoState};
use std::fmt::Write as _;

/// Prefix of every item element identifier.
pub const ELEMENT_PREFIX: &str = "todo";

/// Label of the control that marks every item done.
pub const COMPLETE_ALL_LABEL: &str = "Clear all todos";

/// One rendered item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoRow {
    /// Element identifier, `todo-<id>`
    pub element_id: String,
    /// Text shown next to the checkbox
    pub label: String,
    /// Whether the checkbox is ticked
    pub checked: bool,
    /// Whether the label is drawn struck through
    pub struck_through: bool,
}

impl From<&TodoItem> for TodoRow {
    fn from(item: &TodoItem) -> Self {
        Self {
            element_id: element_id(item.id),
            label: item.label().to_string(),
            checked: item.done,
            struck_through: item.done,
        }
    }
}

/// Element identifier for an item.
#[must_use]
pub fn element_id(id: TodoId) -> String {
    format!("{ELEMENT_PREFIX}-{id}")
}

/// Recover the item id from an element identifier.
///
/// Everything after the first `-` must be a non-negative integer.
///
/// ```
/// use todolist::{view::parse_element_id, TodoId};
///
/// assert_eq!(parse_element_id("todo-3"), Some(TodoId::new(3)));
/// assert_eq!(parse_element_id("todo3"), None);
/// ```
#[must_use]
pub fn parse_element_id(element_id: &str) -> Option<TodoId> {
    let (_, id) = element_id.split_once('-')?;
    id.parse().ok().map(TodoId::new)
}

/// Rows for every item, in display order.
#[must_use]
pub fn rows(state: &TodoState) -> Vec<TodoRow> {
    state.list().iter().map(TodoRow::from).collect()
}

/// Plain-text rendering, one line per item.
///
/// ```text
/// [x] todo-1 Buy milk
/// [ ] todo-2 Walk dog
/// ```
#[must_use]
pub fn render(state: &TodoState) -> String {
    let mut out = String::new();
    for row in rows(state) {
        let mark = if row.checked { 'x' } else { ' ' };
        let _ = writeln!(out, "[{mark}] {} {}", row.element_id, row.label);
    }
    out
}

/// One-line summary, e.g. `1/2 done`.
#[must_use]
pub fn summary(state: &TodoState) -> String {
    format!("{}/{} done", state.completed_count(), state.count())
}
