//! Metric names and descriptions for persisted state and the Store.
//!
//! Counters are recorded through the `metrics` facade. Nothing is exported
//! unless the embedding binary installs a recorder; without one every
//! increment is a no-op.
//!
//! # Example
//!
//! ```rust
//! use todolist_runtime::metrics;
//!
//! // After installing a recorder of your choice:
//! metrics::register_metrics();
//! ```

use metrics::describe_counter;

// Re-export metrics macros for use in other modules
pub use metrics::counter;

/// Durable writes of persisted state.
pub const WRITES_TOTAL: &str = "todolist_persisted_writes_total";

/// Entries removed by key migration.
pub const REMOVALS_TOTAL: &str = "todolist_persisted_removals_total";

/// Unreadable entries replaced by the initial value.
pub const RECOVERIES_TOTAL: &str = "todolist_persisted_recoveries_total";

/// Actions processed by a Store, labelled by `committed`.
pub const STORE_ACTIONS_TOTAL: &str = "todolist_store_actions_total";

/// Register descriptions for every metric this crate records.
pub fn register_metrics() {
    describe_counter!(WRITES_TOTAL, "Total number of persisted state writes");
    describe_counter!(
        REMOVALS_TOTAL,
        "Total number of persisted entries removed by key migration"
    );
    describe_counter!(
        RECOVERIES_TOTAL,
        "Total number of unreadable persisted entries replaced by the initial value"
    );
    describe_counter!(
        STORE_ACTIONS_TOTAL,
        "Total number of actions processed by the store"
    );
}
