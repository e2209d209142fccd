//! Working set and synchronization services.
//!
//! # Responsibility
//! - Hold the in-memory mirror of the persistent store.
//! - Apply each mutation to memory first, then write the delta through.
//!
//! # Invariants
//! - After every completed operation the working set equals store content.
//! - Missing or blank inputs and not-found lookups are silent no-ops.

pub mod todo_service;
pub mod working_set;
