//! Normalized SQLite store.
//!
//! # Responsibility
//! - Persist categories and tasks in the `categories` and `tasks` tables.
//! - Translate category names to `category_id` foreign keys.
//!
//! # Invariants
//! - Category names are unique (`categories.name UNIQUE`).
//! - Deleting a category cascades to its task rows (`ON DELETE CASCADE`).
//! - `tasks.completed` is persisted as `0|1`.

use super::{bool_to_int, StoreError, StoreResult, TodoStore};
use crate::model::category::Category;
use crate::model::task::Task;
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed store using the normalized two-table schema.
pub struct SqliteTodoStore {
    conn: Connection,
}

impl SqliteTodoStore {
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

    fn category_id(&self, name: &str) -> StoreResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM categories WHERE name = ?1;",
                [name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }

    fn require_category_id(&self, name: &str) -> StoreResult<i64> {
        self.category_id(name)?
            .ok_or_else(|| StoreError::MissingCategory(name.to_string()))
    }
}

impl TodoStore for SqliteTodoStore {
    fn load_categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM categories ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();

        while let Some(row) = rows.next()? {
            let category = Category::new(
                row.get::<_, String>("name")?,
                row.get::<_, String>("color")?,
            )
            .with_id(Some(row.get("id")?));
            category.validate().map_err(|err| {
                StoreError::InvalidData(format!("invalid row in categories: {err}"))
            })?;
            categories.push(category);
        }

        Ok(categories)
    }

    fn load_tasks(&self, category: &str) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name, t.completed
             FROM tasks t
             JOIN categories c ON c.id = t.category_id
             WHERE c.name = ?1
             ORDER BY t.id ASC;",
        )?;
        let mut rows = stmt.query([category])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            let name: String = row.get("name")?;
            let completed = match row.get::<_, i64>("completed")? {
                0 => false,
                1 => true,
                other => {
                    return Err(StoreError::InvalidData(format!(
                        "invalid completed value `{other}` in tasks.completed"
                    )));
                }
            };
            tasks.push(Task {
                name,
                category: category.to_string(),
                completed,
            });
        }

        Ok(tasks)
    }

    fn insert_category(&mut self, category: &Category) -> StoreResult<Option<i64>> {
        category.validate()?;

        self.conn.execute(
            "INSERT INTO categories (name, color) VALUES (?1, ?2);",
            params![category.name.as_str(), category.color.as_str()],
        )?;

        Ok(Some(self.conn.last_insert_rowid()))
    }

    fn delete_category(&mut self, name: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM categories WHERE name = ?1;", [name])?;
        Ok(())
    }

    fn replace_categories(&mut self, categories: &[Category]) -> StoreResult<Vec<Category>> {
        for category in categories {
            category.validate()?;
        }

        let tx = self.conn.transaction()?;
        let kept: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
        let existing: Vec<String> = {
            let mut stmt = tx.prepare("SELECT name FROM categories;")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            names
        };
        for name in existing.iter().filter(|name| !kept.contains(name)) {
            tx.execute("DELETE FROM categories WHERE name = ?1;", [name])?;
        }

        let mut replaced = Vec::with_capacity(categories.len());
        for category in categories {
            tx.execute(
                "INSERT INTO categories (name, color) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET color = excluded.color;",
                params![category.name.as_str(), category.color.as_str()],
            )?;
            let id: i64 = tx.query_row(
                "SELECT id FROM categories WHERE name = ?1;",
                [category.name.as_str()],
                |row| row.get(0),
            )?;
            replaced.push(category.clone().with_id(Some(id)));
        }
        tx.commit()?;

        Ok(replaced)
    }

    fn insert_task(&mut self, task: &Task) -> StoreResult<()> {
        task.validate()?;
        let category_id = self.require_category_id(&task.category)?;

        self.conn.execute(
            "INSERT INTO tasks (name, category_id, completed) VALUES (?1, ?2, ?3);",
            params![task.name.as_str(), category_id, bool_to_int(task.completed)],
        )?;

        Ok(())
    }

    fn mark_task_completed(&mut self, name: &str, category: &str) -> StoreResult<()> {
        let category_id = self.require_category_id(category)?;

        self.conn.execute(
            "UPDATE tasks
             SET completed = 1
             WHERE id = (
                SELECT id FROM tasks
                WHERE name = ?1 AND category_id = ?2 AND completed = 0
                ORDER BY id ASC
                LIMIT 1
             );",
            params![name, category_id],
        )?;

        Ok(())
    }

    fn delete_completed_task(&mut self, name: &str, category: &str) -> StoreResult<()> {
        let category_id = self.require_category_id(category)?;

        self.conn.execute(
            "DELETE FROM tasks
             WHERE id = (
                SELECT id FROM tasks
                WHERE name = ?1 AND category_id = ?2 AND completed = 1
                ORDER BY id ASC
                LIMIT 1
             );",
            params![name, category_id],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteTodoStore;
    use crate::db::open_db_in_memory;
    use crate::model::category::{default_categories, Category};
    use crate::model::task::Task;
    use crate::store::{StoreError, TodoStore};

    fn store() -> SqliteTodoStore {
        SqliteTodoStore::new(open_db_in_memory().unwrap())
    }

    #[test]
    fn insert_category_allocates_increasing_ids() {
        let mut store = store();
        let first = store.insert_category(&Category::new("Work", "#0f74cc")).unwrap();
        let second = store.insert_category(&Category::new("Home", "#5db7c6")).unwrap();
        assert!(first.unwrap() < second.unwrap());
    }

    #[test]
    fn task_for_unknown_category_is_rejected() {
        let mut store = store();
        let err = store.insert_task(&Task::new("Buy milk", "Nowhere")).unwrap_err();
        assert!(matches!(err, StoreError::MissingCategory(name) if name == "Nowhere"));
    }

    #[test]
    fn invalid_completed_value_is_reported() {
        let mut store = store();
        store.insert_category(&Category::new("Work", "#0f74cc")).unwrap();
        store.insert_task(&Task::new("Buy milk", "Work")).unwrap();
        store
            .connection()
            .execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 UPDATE tasks SET completed = 7;",
            )
            .unwrap();

        let err = store.load_tasks("Work").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn replace_keeps_tasks_of_retained_categories() {
        let mut store = store();
        store.insert_category(&Category::new("Work", "#000000")).unwrap();
        store.insert_category(&Category::new("Custom", "#111111")).unwrap();
        store.insert_task(&Task::new("Report", "Work")).unwrap();
        store.insert_task(&Task::new("Odd job", "Custom")).unwrap();

        let replaced = store.replace_categories(&default_categories()).unwrap();

        assert_eq!(replaced.len(), 3);
        assert!(replaced.iter().all(|c| c.id.is_some()));
        let loaded = store.load_categories().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].name, "Work");
        assert_eq!(loaded[0].color, "#0f74cc");
        assert_eq!(store.load_tasks("Work").unwrap().len(), 1);
        assert!(store.load_tasks("Custom").unwrap().is_empty());
    }

    #[test]
    fn mark_and_delete_affect_one_record() {
        let mut store = store();
        store.insert_category(&Category::new("Work", "#0f74cc")).unwrap();
        store.insert_task(&Task::new("Buy milk", "Work")).unwrap();

        store.mark_task_completed("Buy milk", "Work").unwrap();
        let tasks = store.load_tasks("Work").unwrap();
        assert!(tasks[0].completed);

        store.delete_completed_task("Buy milk", "Work").unwrap();
        assert!(store.load_tasks("Work").unwrap().is_empty());
    }
}
