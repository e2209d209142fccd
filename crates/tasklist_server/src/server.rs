//! Startup and shutdown orchestration.
//!
//! # Responsibility
//! - Open the database, initialize the working set, then bind the listener.
//! - Stop on Ctrl+C/SIGTERM and close the store connection.
//!
//! # Invariants
//! - The listener is bound only after initialization succeeded.

use crate::config::Config;
use crate::error::StartupError;
use crate::routes::{build_router, AppState};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tasklist_core::db::{open_db, open_db_in_memory};
use tasklist_core::{AnyStore, TodoService};
use tokio::net::TcpListener;
use tokio::signal;

/// Opens the configured store and loads the working set from it.
pub fn open_service(config: &Config) -> Result<TodoService<AnyStore>, StartupError> {
    let conn = if config.is_in_memory() {
        open_db_in_memory()?
    } else {
        open_db(&config.db_path)?
    };
    let store = AnyStore::new(config.store_kind(), conn);
    info!(
        "event=store_open module=server status=ok layout={}",
        store.kind().as_str()
    );
    Ok(TodoService::initialize(store, config.init_options())?)
}

/// Runs the server until a shutdown signal arrives.
pub async fn run(config: Config) -> Result<(), StartupError> {
    let service = open_service(&config)?;
    let state = AppState::new(service, &config.owner_name);
    let app = build_router(state.clone());

    let address = config.socket_addr();
    let listener = TcpListener::bind(&address).await?;
    info!("event=server_listen module=server status=ok address={address}");

    let started_at = Instant::now();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!(
        "event=server_stop module=server status=ok uptime_ms={}",
        started_at.elapsed().as_millis()
    );

    close_store(state);
    Ok(())
}

fn close_store(state: AppState) {
    let Ok(mutex) = Arc::try_unwrap(state.service) else {
        warn!("event=store_close module=server status=skipped reason=shared");
        return;
    };
    match mutex.into_inner().into_store().close() {
        Ok(()) => info!("event=store_close module=server status=ok"),
        Err(err) => error!("event=store_close module=server status=error error={err}"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("event=signal_install module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("event=shutdown module=server status=start signal=ctrl_c"),
        () = terminate => info!("event=shutdown module=server status=start signal=sigterm"),
    }
}
