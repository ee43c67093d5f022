mod config;
mod engine;
mod error;
mod history;
mod pagespeed;
mod rate_limit;
mod routes;
mod server;
mod state;

use clap::Parser;
use std::sync::Arc;
use tracing::info;

use config::{CliArgs, EngineConfig};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arco_impact=info,tower_http=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting arco-impact v{}", env!("CARGO_PKG_VERSION"));
    info!("History: {}", args.data_dir.is_some());
    info!("API key configured: {}", args.api_key.is_some());

    // Startup invariant: weight and band tables must be coherent before we
    // accept a single request.
    engine::validate_tables()?;

    let config = EngineConfig::from_args(args);
    let port = config.port;

    let state = Arc::new(AppState::new(config));

    let router = server::build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("arco-impact listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("arco-impact shutting down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal");
}
