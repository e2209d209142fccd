//! SQLite bootstrap for the tasklist stores.
//!
//! Both store layouts live in the same database file; the schema for each is
//! created by the migration list in [`migrations`], so a file can be reopened
//! with either `--store` setting.
//!
//! Failures surface as [`crate::store::StoreError`], the same error type the
//! stores return once the connection is in use.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
