//! Task record.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// One to-do entry, owned by a category through its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// Name of the owning category.
    pub category: String,
    pub completed: bool,
}

impl Task {
    /// Creates an outstanding task.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            completed: false,
        }
    }

    /// Returns whether this task has the given name and category.
    pub fn matches(&self, name: &str, category: &str) -> bool {
        self.name == name && self.category == category
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("task", &self.name)?;
        require_text("category", &self.category)
    }
}
