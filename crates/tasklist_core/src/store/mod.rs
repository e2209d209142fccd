//! Persistent store adapters for the to-do working set.
//!
//! # Responsibility
//! - Define the typed persistence contract used by the synchronization layer.
//! - Keep SQL and record-encoding details out of service code.
//!
//! # Invariants
//! - Write paths validate records before touching storage.
//! - Read paths reject malformed persisted records instead of masking them.
//! - Adapters never retry; failures are returned to the caller.

pub mod kv_store;
pub mod sqlite_store;

use crate::model::category::Category;
use crate::model::task::Task;
use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by store adapters.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// The database was written by a newer tasklist release.
    SchemaTooNew { found: u32, supported: u32 },
    Validation(ValidationError),
    /// A record could not be encoded or decoded as JSON.
    Serialization(serde_json::Error),
    /// Persisted data violates the record format.
    InvalidData(String),
    /// A task write referenced a category the store does not know.
    MissingCategory(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "database schema v{found} comes from a newer tasklist (this build reads up to v{supported})"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "record serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingCategory(name) => write!(f, "category not found in store: {name}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::InvalidData(_) | Self::MissingCategory(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Typed persistence contract for categories and their tasks.
///
/// Task operations address a task by `(name, category)`; when duplicates
/// exist in storage the oldest matching record is affected.
pub trait TodoStore {
    /// Returns every category in insertion order.
    fn load_categories(&self) -> StoreResult<Vec<Category>>;
    /// Returns every task (outstanding and completed) of one category.
    fn load_tasks(&self, category: &str) -> StoreResult<Vec<Task>>;
    /// Returns whether the layout can store a category under `name`.
    ///
    /// Called before the working set is touched, so a name the store would
    /// refuse never reaches memory.
    fn accepts_category_name(&self, _name: &str) -> bool {
        true
    }
    /// Persists a new category and returns its storage id, if the backend
    /// allocates one.
    fn insert_category(&mut self, category: &Category) -> StoreResult<Option<i64>>;
    /// Deletes a category by name together with all of its tasks.
    fn delete_category(&mut self, name: &str) -> StoreResult<()>;
    /// Replaces the whole category set.
    ///
    /// Categories kept by name retain their tasks; dropped categories lose
    /// theirs. Returns the new set with storage ids filled in.
    fn replace_categories(&mut self, categories: &[Category]) -> StoreResult<Vec<Category>>;
    /// Persists a new outstanding task.
    fn insert_task(&mut self, task: &Task) -> StoreResult<()>;
    /// Flags one outstanding task as completed.
    fn mark_task_completed(&mut self, name: &str, category: &str) -> StoreResult<()>;
    /// Deletes one completed task.
    fn delete_completed_task(&mut self, name: &str, category: &str) -> StoreResult<()>;
}

/// Selects one of the bundled store layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// `categories` + `tasks` tables.
    Normalized,
    /// JSON records keyed by category name.
    KeyValue,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::KeyValue => "kv",
        }
    }
}

/// Runtime-selected store, so callers can pick a layout from configuration.
pub enum AnyStore {
    Normalized(sqlite_store::SqliteTodoStore),
    KeyValue(kv_store::KvTodoStore),
}

impl AnyStore {
    pub fn new(kind: StoreKind, conn: rusqlite::Connection) -> Self {
        match kind {
            StoreKind::Normalized => Self::Normalized(sqlite_store::SqliteTodoStore::new(conn)),
            StoreKind::KeyValue => Self::KeyValue(kv_store::KvTodoStore::new(conn)),
        }
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Normalized(_) => StoreKind::Normalized,
            Self::KeyValue(_) => StoreKind::KeyValue,
        }
    }

    /// Closes the underlying connection, flushing pending SQLite state.
    pub fn close(self) -> StoreResult<()> {
        let conn = match self {
            Self::Normalized(store) => store.into_connection(),
            Self::KeyValue(store) => store.into_connection(),
        };
        conn.close().map_err(|(_, err)| StoreError::from(err))
    }

    fn inner(&self) -> &dyn TodoStore {
        match self {
            Self::Normalized(store) => store,
            Self::KeyValue(store) => store,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn TodoStore {
        match self {
            Self::Normalized(store) => store,
            Self::KeyValue(store) => store,
        }
    }
}

impl TodoStore for AnyStore {
    fn load_categories(&self) -> StoreResult<Vec<Category>> {
        self.inner().load_categories()
    }

    fn load_tasks(&self, category: &str) -> StoreResult<Vec<Task>> {
        self.inner().load_tasks(category)
    }

    fn accepts_category_name(&self, name: &str) -> bool {
        self.inner().accepts_category_name(name)
    }

    fn insert_category(&mut self, category: &Category) -> StoreResult<Option<i64>> {
        self.inner_mut().insert_category(category)
    }

    fn delete_category(&mut self, name: &str) -> StoreResult<()> {
        self.inner_mut().delete_category(name)
    }

    fn replace_categories(&mut self, categories: &[Category]) -> StoreResult<Vec<Category>> {
        self.inner_mut().replace_categories(categories)
    }

    fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        self.inner_mut().insert_task(task)
    }

    fn mark_task_completed(&mut self, name: &str, category: &str) -> StoreResult<()> {
        self.inner_mut().mark_task_completed(name, category)
    }

    fn delete_completed_task(&mut self, name: &str, category: &str) -> StoreResult<()> {
        self.inner_mut().delete_completed_task(name, category)
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
