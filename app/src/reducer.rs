//! Reducer logic for the todo list.
//!
//! Every mutation works on the runtime's copy of the list and, when it
//! produced a new list, asks for it to be persisted. The only action that
//! can leave the list untouched is a toggle of an id that is not present.

use crate::types::{TodoAction, TodoId, TodoItem, TodoState};
use todolist_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};

/// Environment dependencies for the todo reducer
///
/// The todo list needs nothing injected; ids come from the list itself.
#[derive(Clone, Debug, Default)]
pub struct TodoEnvironment;

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add(state: &mut TodoState, text: Option<String>) {
        let item = TodoItem::new(state.next_id(), text);
        state.items_mut().push(item);
    }

    /// Returns `false` when no item has the id
    ///
    /// Lists built through `Add` never repeat an id. A list read from storage
    /// that does repeat one only has its first matching item flipped.
    fn toggle(state: &mut TodoState, id: TodoId) -> bool {
        let Some(item) = state.items_mut().iter_mut().find(|t| t.id == id) else {
            return false;
        };
        item.done = !item.done;
        true
    }

    fn complete_all(state: &mut TodoState) {
        for item in state.items_mut() {
            item.done = true;
        }
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect; 4]> {
        match action {
            TodoAction::Add { text } => {
                Self::add(state, text);
                smallvec![Effect::Persist]
            },

            TodoAction::Toggle { id } => {
                if Self::toggle(state, id) {
                    smallvec![Effect::Persist]
                } else {
                    tracing::debug!(%id, "Ignoring toggle of unknown todo");
                    smallvec![Effect::None]
                }
            },

            TodoAction::CompleteAll => {
                Self::complete_all(state);
                smallvec![Effect::Persist]
            },
        }
    }
}
