//! Core of the tasklist application: a store-backed in-memory working set of
//! categories and tasks.
//! This crate is the single source of truth for working-set invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{default_categories, Category, DEFAULT_CATEGORIES};
pub use model::task::Task;
pub use model::ValidationError;
pub use service::todo_service::{
    split_composite, split_composite_where, InitOptions, Outcome, ServiceError, ServiceResult,
    TodoService,
};
pub use service::working_set::WorkingSet;
pub use store::kv_store::KvTodoStore;
pub use store::sqlite_store::SqliteTodoStore;
pub use store::{AnyStore, StoreError, StoreKind, StoreResult, TodoStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
