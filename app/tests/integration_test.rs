//! Integration tests for the todo list with a persisted Store
//!
//! These tests drive the full flow: actions through the Store, state written
//! to a key-value store, and state read back by a fresh Store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use tempfile::TempDir;
use todolist::cli::{self, Command, CommandError};
use todolist::{open_store, TodoAction, TodoId, TodoItem, TodoState, TodoStore};
use todolist_core::key_value::KeyValueStore;
use todolist_runtime::{FileKeyValueStore, InitialValue, LoadOutcome, StoreError};
use todolist_testing::{init_test_tracing, FailingKeyValueStore, InMemoryKeyValueStore};

fn open_empty(storage: Arc<dyn KeyValueStore>, key: &str) -> TodoStore {
    open_store(storage, key, InitialValue::Value(TodoState::new())).unwrap()
}

fn item(id: u64, text: &str, done: bool) -> TodoItem {
    TodoItem {
        id: TodoId::new(id),
        text: Some(text.to_string()),
        done,
    }
}

#[tokio::test]
async fn test_scenario_persists_every_step() {
    init_test_tracing();
    let storage = Arc::new(InMemoryKeyValueStore::new());
    let store = open_empty(storage.clone(), "todos");

    store.send(TodoAction::add("Buy milk")).await.unwrap();
    assert_eq!(
        storage.get("todos").unwrap().as_deref(),
        Some(r#"[{"id":1,"text":"Buy milk","done":false}]"#)
    );

    store.send(TodoAction::toggle(1)).await.unwrap();
    assert_eq!(
        storage.get("todos").unwrap().as_deref(),
        Some(r#"[{"id":1,"text":"Buy milk","done":true}]"#)
    );

    store.send(TodoAction::add("Walk dog")).await.unwrap();
    store.send(TodoAction::CompleteAll).await.unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(
        state.list(),
        &[item(1, "Buy milk", true), item(2, "Walk dog", true)]
    );
}

#[tokio::test]
async fn test_round_trip_through_fresh_store() {
    let storage = Arc::new(InMemoryKeyValueStore::new());
    let first = open_empty(storage.clone(), "todos");
    first.send(TodoAction::add("a")).await.unwrap();
    first.send(TodoAction::add("b")).await.unwrap();
    first.send(TodoAction::toggle(2)).await.unwrap();
    let written = first.state(Clone::clone).await;

    let second = open_empty(storage, "todos");

    assert_eq!(second.load_outcome().await, LoadOutcome::Restored);
    assert_eq!(second.state(Clone::clone).await, written);
}

#[tokio::test]
async fn test_round_trip_through_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todolist.json");

    let store = open_empty(Arc::new(FileKeyValueStore::new(&path)), "todos");
    store.send(TodoAction::add("Buy milk")).await.unwrap();
    drop(store);

    let reopened = open_empty(Arc::new(FileKeyValueStore::new(&path)), "todos");
    assert_eq!(
        reopened.state(|s| s.list().to_vec()).await,
        vec![item(1, "Buy milk", false)]
    );
}

#[tokio::test]
async fn test_key_migration_leaves_only_new_key() {
    let storage = Arc::new(InMemoryKeyValueStore::new());
    let store = open_empty(storage.clone(), "k1");
    store.send(TodoAction::add("x")).await.unwrap();

    store.set_key("k2").await.unwrap();

    assert_eq!(storage.keys(), vec!["k2".to_string()]);
    let reopened = open_empty(storage, "k2");
    assert_eq!(reopened.state(TodoState::count).await, 1);
}

#[tokio::test]
async fn test_reads_data_written_by_the_browser_widget() {
    let storage = Arc::new(InMemoryKeyValueStore::with_entries([(
        "todos",
        r#"[{"id":1,"text":"Dummy Text","done":false},{"id":2,"done":true}]"#,
    )]));

    let store = open_empty(storage, "todos");

    let state = store.state(Clone::clone).await;
    assert_eq!(state.count(), 2);
    assert_eq!(state.list()[1].text, None);
    assert!(state.list()[1].done);
}

#[tokio::test]
async fn test_corrupt_entry_falls_back_to_initial_list() {
    init_test_tracing();
    let storage = Arc::new(InMemoryKeyValueStore::with_entries([("todos", "[{oops")]));

    let store = open_store(storage.clone(), "todos", InitialValue::lazy(TodoState::starter)).unwrap();

    assert!(store.load_outcome().await.is_recovered());
    assert_eq!(store.state(Clone::clone).await, TodoState::starter());
    assert_eq!(
        storage.get("todos").unwrap().as_deref(),
        Some(r#"[{"id":1,"text":"Dummy Text","done":false}]"#)
    );
}

#[tokio::test]
async fn test_write_failure_surfaces_and_keeps_state() {
    let storage = Arc::new(FailingKeyValueStore::new());
    let store = open_empty(storage.clone(), "todos");
    store.send(TodoAction::add("kept")).await.unwrap();

    storage.fail_writes(true);
    let result = store.send(TodoAction::add("lost")).await;

    assert!(matches!(result, Err(StoreError::Persistence(_))));
    assert_eq!(store.state(TodoState::count).await, 1);
}

#[tokio::test]
async fn test_quota_exceeded_on_file_store() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileKeyValueStore::new(dir.path().join("small.json")).with_quota(64));
    let store = open_empty(storage, "todos");

    let result = store.send(TodoAction::add("x".repeat(100))).await;

    assert!(result.is_err());
    assert_eq!(store.state(TodoState::count).await, 0);
}

#[tokio::test]
async fn test_toggle_of_unknown_id_writes_nothing() {
    let storage = Arc::new(InMemoryKeyValueStore::new());
    let store = open_empty(storage.clone(), "todos");
    store.send(TodoAction::add("a")).await.unwrap();
    let writes = storage.write_count();

    let changed = store.send(TodoAction::toggle(9)).await.unwrap();

    assert!(!changed);
    assert_eq!(storage.write_count(), writes);
}

#[tokio::test]
async fn test_cli_commands_drive_the_store() {
    let storage = Arc::new(InMemoryKeyValueStore::new());
    let store = open_empty(storage.clone(), "todos");

    let outcome = cli::execute(
        Command::Add {
            text: "Buy milk".to_string(),
            allow_empty: false,
        },
        &store,
    )
    .await
    .unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.output, "[ ] todo-1 Buy milk\n0/1 done\n");

    let outcome = cli::execute(
        Command::Toggle {
            target: "todo-1".to_string(),
        },
        &store,
    )
    .await
    .unwrap();
    assert_eq!(outcome.output, "[x] todo-1 Buy milk\n1/1 done\n");

    let outcome = cli::execute(Command::List, &store).await.unwrap();
    assert!(!outcome.changed);

    let outcome = cli::execute(
        Command::RenameKey {
            key: "chores".to_string(),
        },
        &store,
    )
    .await
    .unwrap();
    assert!(outcome.changed);
    assert_eq!(storage.keys(), vec!["chores".to_string()]);

    let writes = storage.write_count();
    let outcome = cli::execute(
        Command::RenameKey {
            key: "chores".to_string(),
        },
        &store,
    )
    .await
    .unwrap();
    assert!(!outcome.changed);
    assert_eq!(storage.write_count(), writes);
}

#[tokio::test]
async fn test_failed_rename_keeps_todos_under_old_key() {
    let storage = Arc::new(FailingKeyValueStore::new());
    let store = open_empty(storage.clone(), "todos");
    store.send(TodoAction::add("Buy milk")).await.unwrap();

    storage.fail_writes_to("chores");
    let result = cli::execute(
        Command::RenameKey {
            key: "chores".to_string(),
        },
        &store,
    )
    .await;

    assert!(matches!(result, Err(CommandError::Store(_))));
    assert_eq!(store.key().await, "todos");
    let reopened = open_empty(storage, "todos");
    assert_eq!(
        reopened.state(|s| s.list().to_vec()).await,
        vec![item(1, "Buy milk", false)]
    );
}

#[tokio::test]
async fn test_cli_rejects_empty_text_unless_allowed() {
    let store = open_empty(Arc::new(InMemoryKeyValueStore::new()), "todos");

    let rejected = cli::execute(
        Command::Add {
            text: "  ".to_string(),
            allow_empty: false,
        },
        &store,
    )
    .await;
    assert!(matches!(rejected, Err(CommandError::EmptyText)));

    let accepted = cli::execute(
        Command::Add {
            text: String::new(),
            allow_empty: true,
        },
        &store,
    )
    .await
    .unwrap();
    assert!(accepted.changed);
    assert_eq!(store.state(TodoState::count).await, 1);
}

#[tokio::test]
async fn test_concurrent_adds_get_distinct_ids() {
    let store = open_empty(Arc::new(InMemoryKeyValueStore::new()), "todos");

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store.send(TodoAction::add(format!("item {i}"))).await.unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let mut ids: Vec<u64> = store
        .state(|s| s.list().iter().map(|t| t.id.get()).collect())
        .await;
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}
