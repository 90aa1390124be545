//! Artifice server - HTTP front end for the core library
//!
//! Settings come from flags or `APP__*` environment variables.
//! Returns non-zero when startup fails.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use artifice_core::api::{self, AppState};
use artifice_core::{Settings, SERVICE_VERSION};

#[tokio::main]
async fn main() -> ExitCode {
    let settings = Settings::parse();

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = match settings.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(host = %settings.host, port = settings.port, "invalid bind address: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(settings) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("failed to create scratch directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, "failed to bind: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%addr, version = SERVICE_VERSION, "artifice server listening");
    let served = axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match served {
        Ok(()) => {
            tracing::info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
