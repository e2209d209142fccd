//! Domain model for the to-do working set.
//!
//! # Responsibility
//! - Define the task and category records shared by stores and services.
//! - Keep field validation next to the data it guards.
//!
//! # Invariants
//! - Tasks reference categories by name, never by storage id.
//! - Name/color comparisons are case-sensitive exact matches.

pub mod category;
pub mod task;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for task/category fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    BlankField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "field `{field}` must not be blank"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}
