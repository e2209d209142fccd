//! Server entry point.
//!
//! # Responsibility
//! - Parse configuration, start logging, and run the HTTP server.
//! - Exit non-zero when startup fails.

use clap::Parser;
use log::error;
use std::process::ExitCode;
use tasklist_core::{default_log_level, init_logging};
use tasklist_server::{server, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&level, config.log_dir.as_deref()) {
        eprintln!("tasklist: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_run module=server status=error error={err}");
            ExitCode::FAILURE
        }
    }
}
