//! Synchronization service over the working set and a persistent store.
//!
//! # Responsibility
//! - Initialize the working set from the store at startup.
//! - Apply add/tick/remove/category mutations in memory, then persist them.
//!
//! # Invariants
//! - Memory is mutated before the store write; a failed write is logged and
//!   returned, leaving memory ahead of the store until the next restart.
//! - Lookups use case-sensitive exact equality and linear scans.
//! - Blank or missing inputs and not-found lookups return `Outcome::Unchanged`.

use crate::model::category::{default_categories, Category};
use crate::model::task::Task;
use crate::service::working_set::WorkingSet;
use crate::store::{StoreError, StoreResult, TodoStore};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error raised by the synchronization layer.
#[derive(Debug)]
pub enum ServiceError {
    /// Persistence failed; memory may be ahead of the store.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Whether an operation changed the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged,
}

/// Startup options for [`TodoService::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOptions {
    /// Persist the default categories when the store has none.
    pub seed_default_categories: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            seed_default_categories: true,
        }
    }
}

/// Store-backed cache of all categories and tasks.
pub struct TodoService<S: TodoStore> {
    store: S,
    working_set: WorkingSet,
}

impl<S: TodoStore> TodoService<S> {
    /// Loads every category and its tasks from `store`.
    ///
    /// # Errors
    /// - Returns the first store failure; callers treat it as fatal.
    pub fn initialize(mut store: S, options: InitOptions) -> ServiceResult<Self> {
        let started_at = Instant::now();
        info!("event=store_init module=service status=start");

        let result = load_working_set(&mut store, options);
        match result {
            Ok(working_set) => {
                info!(
                    "event=store_init module=service status=ok duration_ms={} categories={} outstanding={} completed={}",
                    started_at.elapsed().as_millis(),
                    working_set.categories().len(),
                    working_set.outstanding().len(),
                    working_set.completed().len()
                );
                Ok(Self { store, working_set })
            }
            Err(err) => {
                error!(
                    "event=store_init module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    pub fn outstanding(&self) -> &[Task] {
        self.working_set.outstanding()
    }

    pub fn completed(&self) -> &[Task] {
        self.working_set.completed()
    }

    pub fn categories(&self) -> &[Category] {
        self.working_set.categories()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Releases the store, e.g. to close its connection on shutdown.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Adds an outstanding task unless the same name+category already exists.
    ///
    /// Tasks for categories missing from the working set are ignored.
    pub fn add_task(&mut self, name: Option<&str>, category: Option<&str>) -> ServiceResult<Outcome> {
        let (Some(name), Some(category)) = (present(name), present(category)) else {
            return Ok(Outcome::Unchanged);
        };
        if self.working_set.contains_task(name, category) {
            info!("event=task_add module=service status=skipped reason=duplicate");
            return Ok(Outcome::Unchanged);
        }
        if !self.working_set.has_category(category) {
            warn!("event=task_add module=service status=skipped reason=unknown_category");
            return Ok(Outcome::Unchanged);
        }

        let task = Task::new(name, category);
        self.working_set.push_outstanding(task.clone());
        persist("task_add", self.store.insert_task(&task))?;
        Ok(Outcome::Applied)
    }

    /// Moves an outstanding task to the completed container.
    pub fn tick_task(&mut self, name: Option<&str>, category: Option<&str>) -> ServiceResult<Outcome> {
        let (Some(name), Some(category)) = (present(name), present(category)) else {
            return Ok(Outcome::Unchanged);
        };
        if !self.working_set.complete(name, category) {
            return Ok(Outcome::Unchanged);
        }

        persist("task_tick", self.store.mark_task_completed(name, category))?;
        Ok(Outcome::Applied)
    }

    /// Deletes a completed task.
    pub fn remove_task(&mut self, name: Option<&str>, category: Option<&str>) -> ServiceResult<Outcome> {
        let (Some(name), Some(category)) = (present(name), present(category)) else {
            return Ok(Outcome::Unchanged);
        };
        if self.working_set.remove_completed(name, category).is_none() {
            return Ok(Outcome::Unchanged);
        }

        persist("task_remove", self.store.delete_completed_task(name, category))?;
        Ok(Outcome::Applied)
    }

    /// Adds a category unless one with the same name exists or the store
    /// cannot hold that name.
    pub fn add_category(&mut self, name: Option<&str>, color: Option<&str>) -> ServiceResult<Outcome> {
        let (Some(name), Some(color)) = (present(name), present(color)) else {
            return Ok(Outcome::Unchanged);
        };
        if self.working_set.has_category(name) {
            info!("event=category_add module=service status=skipped reason=duplicate");
            return Ok(Outcome::Unchanged);
        }
        if !self.store.accepts_category_name(name) {
            warn!("event=category_add module=service status=skipped reason=reserved_name");
            return Ok(Outcome::Unchanged);
        }

        let category = Category::new(name, color);
        self.working_set.push_category(category.clone());
        let id = persist("category_add", self.store.insert_category(&category))?;
        self.working_set.set_category_id(name, id);
        Ok(Outcome::Applied)
    }

    /// Removes the category matching name and color, and every task in it.
    pub fn remove_category(&mut self, name: Option<&str>, color: Option<&str>) -> ServiceResult<Outcome> {
        let (Some(name), Some(color)) = (present(name), present(color)) else {
            return Ok(Outcome::Unchanged);
        };
        if self.working_set.remove_category(name, color).is_none() {
            return Ok(Outcome::Unchanged);
        }
        let purged = self.working_set.purge_category_tasks(name);
        info!("event=category_remove module=service status=ok purged_tasks={purged}");

        persist("category_remove", self.store.delete_category(name))?;
        Ok(Outcome::Applied)
    }

    /// Replaces the category set with the defaults.
    ///
    /// Defaults that already exist keep their tasks; tasks of dropped
    /// categories are removed along with them.
    pub fn reset_categories(&mut self) -> ServiceResult<Outcome> {
        let defaults = default_categories();
        let dropped = self.working_set.replace_categories(defaults.clone());
        let purged: usize = dropped
            .iter()
            .map(|name| self.working_set.purge_category_tasks(name))
            .sum();
        info!(
            "event=category_reset module=service status=ok dropped_categories={} purged_tasks={}",
            dropped.len(),
            purged
        );

        let persisted = persist("category_reset", self.store.replace_categories(&defaults))?;
        for category in persisted {
            self.working_set.set_category_id(&category.name, category.id);
        }
        Ok(Outcome::Applied)
    }
}

fn load_working_set<S: TodoStore>(store: &mut S, options: InitOptions) -> StoreResult<WorkingSet> {
    let mut categories = store.load_categories()?;
    if categories.is_empty() && options.seed_default_categories {
        info!("event=store_seed module=service status=start");
        categories = store.replace_categories(&default_categories())?;
    }

    let mut tasks = Vec::new();
    for category in &categories {
        tasks.extend(store.load_tasks(&category.name)?);
    }

    Ok(WorkingSet::from_parts(categories, tasks))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn persist<T>(event: &'static str, result: StoreResult<T>) -> ServiceResult<T> {
    match result {
        Ok(value) => {
            info!("event={event} module=service status=ok");
            Ok(value)
        }
        Err(err) => {
            error!("event={event} module=service status=error error={err}");
            Err(err.into())
        }
    }
}

/// Splits a composite form value such as `"name_category"` or
/// `"name_color"` at its last underscore.
///
/// Returns `None` when there is no underscore or either side is empty.
pub fn split_composite(value: &str) -> Option<(&str, &str)> {
    let (left, right) = value.rsplit_once('_')?;
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}

/// Splits a composite form value at the rightmost underscore whose halves
/// satisfy `known`, falling back to [`split_composite`].
///
/// Both halves may contain underscores (`"Buy milk_My_List"`), so the split
/// point is resolved against what the caller actually holds.
pub fn split_composite_where<'a>(
    value: &'a str,
    mut known: impl FnMut(&str, &str) -> bool,
) -> Option<(&'a str, &'a str)> {
    value
        .match_indices('_')
        .rev()
        .map(|(index, _)| (&value[..index], &value[index + 1..]))
        .filter(|(left, right)| !left.is_empty() && !right.is_empty())
        .find(|&(left, right)| known(left, right))
        .or_else(|| split_composite(value))
}

#[cfg(test)]
mod tests {
    use super::{present, split_composite, split_composite_where};

    #[test]
    fn split_composite_uses_last_underscore() {
        assert_eq!(split_composite("Buy milk_Work"), Some(("Buy milk", "Work")));
        assert_eq!(split_composite("pay_rent_Home"), Some(("pay_rent", "Home")));
        assert_eq!(split_composite("Work_#0f74cc"), Some(("Work", "#0f74cc")));
    }

    #[test]
    fn split_composite_rejects_incomplete_values() {
        assert_eq!(split_composite("nounderscore"), None);
        assert_eq!(split_composite("_Work"), None);
        assert_eq!(split_composite("task_"), None);
    }

    #[test]
    fn split_composite_where_prefers_a_known_pair() {
        let known = |name: &str, category: &str| name == "Buy milk" && category == "My_List";
        assert_eq!(
            split_composite_where("Buy milk_My_List", known),
            Some(("Buy milk", "My_List"))
        );
        assert_eq!(
            split_composite_where("pay_rent_Home", |name, _| name == "pay_rent"),
            Some(("pay_rent", "Home"))
        );
    }

    #[test]
    fn split_composite_where_falls_back_to_last_underscore() {
        assert_eq!(
            split_composite_where("a_b_c", |_, _| false),
            Some(("a_b", "c"))
        );
        assert_eq!(split_composite_where("plain", |_, _| true), None);
    }

    #[test]
    fn blank_values_are_not_present() {
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some("x")), Some("x"));
    }
}
