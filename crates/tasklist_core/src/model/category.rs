//! Category record and the built-in default set.
//!
//! # Invariants
//! - Default categories are always `Work`, `Home`, `Garden` in that order.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Built-in categories restored by a reset and seeded into empty stores.
pub const DEFAULT_CATEGORIES: [(&str, &str); 3] = [
    ("Work", "#0f74cc"),
    ("Home", "#5db7c6"),
    ("Garden", "#6b65da"),
];

/// Named, colored grouping that tasks reference by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// CSS color string, e.g. `#0f74cc`.
    pub color: String,
    /// Storage id; only the normalized store allocates one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: Option<i64>) -> Self {
        self.id = id;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("category", &self.name)?;
        require_text("color", &self.color)
    }
}

/// Returns a fresh copy of the default category set.
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, color)| Category::new(*name, *color))
        .collect()
}
