//! HTTP surface for the tasklist working set.

pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod server;

pub use config::Config;
pub use error::{AppError, StartupError};
pub use routes::{build_router, AppState};
