//! Command-line and environment configuration.
//!
//! # Responsibility
//! - Parse server, store and logging settings with env-var fallbacks.
//! - Map user-facing choices onto core types.

use clap::{Parser, ValueEnum};
use tasklist_core::{InitOptions, StoreKind};

/// Database path that selects an in-memory SQLite database.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Persisted layout of the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreLayout {
    /// `categories(id, name, color)` + `tasks(id, name, category_id, completed)`.
    Normalized,
    /// JSON records keyed by category name.
    Kv,
}

/// Runtime configuration for the tasklist server.
#[derive(Debug, Clone, Parser)]
#[command(name = "tasklist", version, about = "Minimal to-do list web application")]
pub struct Config {
    /// SQLite database file, or `:memory:` for a throwaway database.
    #[arg(long, env = "TASKLIST_DB_PATH", default_value = "tasklist.sqlite3")]
    pub db_path: String,

    #[arg(long, env = "TASKLIST_STORE", value_enum, default_value_t = StoreLayout::Normalized)]
    pub store: StoreLayout,

    #[arg(long, env = "TASKLIST_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "TASKLIST_PORT", default_value_t = 4444)]
    pub port: u16,

    /// trace|debug|info|warn|error; defaults to debug in debug builds, info otherwise.
    #[arg(long, env = "TASKLIST_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr when unset.
    #[arg(long, env = "TASKLIST_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Start with no categories instead of Work/Home/Garden on an empty store.
    #[arg(long)]
    pub no_seed_defaults: bool,

    /// Name shown in page headings.
    #[arg(long, env = "TASKLIST_OWNER", default_value = "Tasklist")]
    pub owner_name: String,
}

impl Config {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_kind(&self) -> StoreKind {
        match self.store {
            StoreLayout::Normalized => StoreKind::Normalized,
            StoreLayout::Kv => StoreKind::KeyValue,
        }
    }

    pub fn init_options(&self) -> InitOptions {
        InitOptions {
            seed_default_categories: !self.no_seed_defaults,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path == IN_MEMORY_DB
    }
}
