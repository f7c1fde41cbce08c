// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fleetd: the fleet orchestrator daemon.

use fleet_core::SystemClock;
use fleet_daemon::transport::HttpTransport;
use fleet_daemon::{App, Config};
use fleet_storage::MemoryStore;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("startup failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    let transport = Arc::new(HttpTransport::new(config.dispatch_timeout)?);
    let app = App::new(Arc::new(MemoryStore::new()), SystemClock, config);

    let shutdown = CancellationToken::new();
    app.spawn_loops(transport, shutdown.clone());

    let addr = app.config.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    let router = fleet_daemon::http::router(app);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            shutdown.cancel();
        })
        .await?;
    Ok(())
}
