//! Key-value store over a single SQLite table.
//!
//! # Responsibility
//! - Expose a generic `get/set/delete/query` record contract.
//! - Encode categories and tasks as JSON documents on top of it.
//!
//! # Invariants
//! - Key `categories` holds a JSON array of `{category, color}`.
//! - Every other key is a category name holding a JSON array of
//!   `{task, ticked}` with `ticked` in `0|1`.
//! - A category key exists for every category listed under `categories`.

use super::{StoreError, StoreResult, TodoStore};
use crate::model::category::Category;
use crate::model::task::Task;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Key holding the category list.
pub const CATEGORIES_KEY: &str = "categories";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CategoryRecord {
    category: String,
    color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TaskRecord {
    task: String,
    ticked: u8,
}

/// SQLite-backed key-value store.
pub struct KvTodoStore {
    conn: Connection,
}

impl KvTodoStore {
    /// Wraps a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_records WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Inserts or overwrites the value stored under `key`.
    pub fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_records (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        debug!("event=kv_set module=store status=ok key={key}");
        Ok(())
    }

    /// Deletes `key`; returns whether a record existed.
    pub fn delete(&self, key: &str) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_records WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    /// Returns all `(key, value)` pairs whose key matches a SQL `LIKE`
    /// pattern (`%` for any run, `_` for one character), ordered by key.
    pub fn query(&self, pattern: &str) -> StoreResult<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM kv_records WHERE key LIKE ?1 ORDER BY key ASC;")?;
        let records = stmt
            .query_map([pattern], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn read_categories(&self) -> StoreResult<Vec<CategoryRecord>> {
        match self.get(CATEGORIES_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_categories(&self, records: &[CategoryRecord]) -> StoreResult<()> {
        self.set(CATEGORIES_KEY, &serde_json::to_string(records)?)
    }

    fn read_tasks(&self, category: &str) -> StoreResult<Vec<TaskRecord>> {
        let records: Vec<TaskRecord> = match self.get(category)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => return Ok(Vec::new()),
        };
        if let Some(bad) = records.iter().find(|record| record.ticked > 1) {
            return Err(StoreError::InvalidData(format!(
                "invalid ticked value `{}` under key `{category}`",
                bad.ticked
            )));
        }
        Ok(records)
    }

    fn write_tasks(&self, category: &str, records: &[TaskRecord]) -> StoreResult<()> {
        self.set(category, &serde_json::to_string(records)?)
    }

    fn ensure_category_key(&self, category: &str) -> StoreResult<()> {
        if self.get(category)?.is_none() {
            self.write_tasks(category, &[])?;
        }
        Ok(())
    }

    fn require_listed(&self, category: &str) -> StoreResult<()> {
        let listed = self
            .read_categories()?
            .iter()
            .any(|record| record.category == category);
        if !listed {
            return Err(StoreError::MissingCategory(category.to_string()));
        }
        Ok(())
    }
}

fn reject_reserved(name: &str) -> StoreResult<()> {
    if name == CATEGORIES_KEY {
        return Err(StoreError::InvalidData(format!(
            "category name `{name}` collides with a reserved key"
        )));
    }
    Ok(())
}

impl TodoStore for KvTodoStore {
    fn accepts_category_name(&self, name: &str) -> bool {
        name != CATEGORIES_KEY
    }

    fn load_categories(&self) -> StoreResult<Vec<Category>> {
        self.read_categories()?
            .into_iter()
            .map(|record| {
                let category = Category::new(record.category, record.color);
                category.validate().map_err(|err| {
                    StoreError::InvalidData(format!("invalid record under `categories`: {err}"))
                })?;
                Ok(category)
            })
            .collect()
    }

    fn load_tasks(&self, category: &str) -> StoreResult<Vec<Task>> {
        Ok(self
            .read_tasks(category)?
            .into_iter()
            .map(|record| Task {
                name: record.task,
                category: category.to_string(),
                completed: record.ticked == 1,
            })
            .collect())
    }

    fn insert_category(&mut self, category: &Category) -> StoreResult<Option<i64>> {
        category.validate()?;
        reject_reserved(&category.name)?;

        let mut records = self.read_categories()?;
        records.push(CategoryRecord {
            category: category.name.clone(),
            color: category.color.clone(),
        });
        self.write_categories(&records)?;
        self.ensure_category_key(&category.name)?;

        Ok(None)
    }

    fn delete_category(&mut self, name: &str) -> StoreResult<()> {
        let mut records = self.read_categories()?;
        records.retain(|record| record.category != name);
        self.write_categories(&records)?;
        if name != CATEGORIES_KEY {
            self.delete(name)?;
        }
        Ok(())
    }

    fn replace_categories(&mut self, categories: &[Category]) -> StoreResult<Vec<Category>> {
        for category in categories {
            category.validate()?;
            reject_reserved(&category.name)?;
        }

        let previous = self.read_categories()?;
        let records: Vec<CategoryRecord> = categories
            .iter()
            .map(|category| CategoryRecord {
                category: category.name.clone(),
                color: category.color.clone(),
            })
            .collect();
        self.write_categories(&records)?;

        for dropped in previous
            .iter()
            .filter(|old| !categories.iter().any(|new| new.name == old.category))
        {
            self.delete(&dropped.category)?;
        }
        for category in categories {
            self.ensure_category_key(&category.name)?;
        }

        Ok(categories
            .iter()
            .map(|category| category.clone().with_id(None))
            .collect())
    }

    fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        task.validate()?;
        self.require_listed(&task.category)?;

        let mut records = self.read_tasks(&task.category)?;
        records.push(TaskRecord {
            task: task.name.clone(),
            ticked: u8::from(task.completed),
        });
        self.write_tasks(&task.category, &records)
    }

    fn mark_task_completed(&mut self, name: &str, category: &str) -> StoreResult<()> {
        self.require_listed(category)?;

        let mut records = self.read_tasks(category)?;
        if let Some(record) = records
            .iter_mut()
            .find(|record| record.task == name && record.ticked == 0)
        {
            record.ticked = 1;
            self.write_tasks(category, &records)?;
        }
        Ok(())
    }

    fn delete_completed_task(&mut self, name: &str, category: &str) -> StoreResult<()> {
        self.require_listed(category)?;

        let mut records = self.read_tasks(category)?;
        if let Some(index) = records
            .iter()
            .position(|record| record.task == name && record.ticked == 1)
        {
            records.remove(index);
            self.write_tasks(category, &records)?;
        }
        Ok(())
    }
}
