//! In-memory working set.
//!
//! # Responsibility
//! - Keep outstanding tasks, completed tasks and categories in request order.
//! - Provide the linear-scan lookups used by the synchronization layer.
//!
//! # Invariants
//! - A task lives in exactly one of `outstanding` / `completed`.
//! - `outstanding` only holds tasks with `completed == false`, `completed`
//!   only tasks with `completed == true`.

use crate::model::category::Category;
use crate::model::task::Task;
use serde::Serialize;

/// Snapshot of all categories and tasks held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkingSet {
    outstanding: Vec<Task>,
    completed: Vec<Task>,
    categories: Vec<Category>,
}

impl WorkingSet {
    /// Builds a working set, partitioning tasks by their completion flag.
    pub fn from_parts(categories: Vec<Category>, tasks: impl IntoIterator<Item = Task>) -> Self {
        let (completed, outstanding) = tasks.into_iter().partition(|task| task.completed);
        Self {
            outstanding,
            completed,
            categories,
        }
    }

    pub fn outstanding(&self) -> &[Task] {
        &self.outstanding
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns whether a task with this name and category exists in either
    /// container.
    pub fn contains_task(&self, name: &str, category: &str) -> bool {
        self.outstanding
            .iter()
            .chain(self.completed.iter())
            .any(|task| task.matches(name, category))
    }

    pub fn is_outstanding(&self, name: &str, category: &str) -> bool {
        self.outstanding.iter().any(|task| task.matches(name, category))
    }

    pub fn is_completed(&self, name: &str, category: &str) -> bool {
        self.completed.iter().any(|task| task.matches(name, category))
    }

    /// Returns whether a category with exactly this name and color exists.
    pub fn has_category_colored(&self, name: &str, color: &str) -> bool {
        self.categories
            .iter()
            .any(|category| category.name == name && category.color == color)
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|category| category.name == name)
    }

    pub(crate) fn push_outstanding(&mut self, mut task: Task) {
        task.completed = false;
        self.outstanding.push(task);
    }

    /// Moves the first matching outstanding task to `completed`.
    pub(crate) fn complete(&mut self, name: &str, category: &str) -> bool {
        let Some(index) = self
            .outstanding
            .iter()
            .position(|task| task.matches(name, category))
        else {
            return false;
        };
        let mut task = self.outstanding.remove(index);
        task.completed = true;
        self.completed.push(task);
        true
    }

    /// Removes the first matching completed task.
    pub(crate) fn remove_completed(&mut self, name: &str, category: &str) -> Option<Task> {
        let index = self
            .completed
            .iter()
            .position(|task| task.matches(name, category))?;
        Some(self.completed.remove(index))
    }

    pub(crate) fn push_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub(crate) fn set_category_id(&mut self, name: &str, id: Option<i64>) {
        if let Some(category) = self
            .categories
            .iter_mut()
            .find(|category| category.name == name)
        {
            category.id = id;
        }
    }

    /// Removes the first category matching both name and color.
    pub(crate) fn remove_category(&mut self, name: &str, color: &str) -> Option<Category> {
        let index = self
            .categories
            .iter()
            .position(|category| category.name == name && category.color == color)?;
        Some(self.categories.remove(index))
    }

    /// Removes every task (outstanding and completed) of `category`.
    ///
    /// Returns the number of removed tasks.
    pub(crate) fn purge_category_tasks(&mut self, category: &str) -> usize {
        let mut removed = 0;
        for container in [&mut self.outstanding, &mut self.completed] {
            while let Some(index) = container.iter().position(|task| task.category == category) {
                container.remove(index);
                removed += 1;
            }
        }
        removed
    }

    /// Replaces the category set, returning the names that were dropped.
    pub(crate) fn replace_categories(&mut self, categories: Vec<Category>) -> Vec<String> {
        let previous = std::mem::replace(&mut self.categories, categories);
        previous
            .into_iter()
            .map(|category| category.name)
            .filter(|name| !self.has_category(name))
            .collect()
    }
}
