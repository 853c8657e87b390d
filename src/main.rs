use std::sync::Arc;

use anyhow::Context;
use sheet_sync::config::AppConfig;
use sheet_sync::sheets::GoogleSheetsConnector;
use sheet_sync::{app, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up GOOGLE_* and SHEET_ID
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    // Configuration is read exactly once and shared read-only from here on
    let config = Arc::new(AppConfig::from_env());
    for warning in config.credential_warnings() {
        tracing::warn!("{}; sheet requests will fail until this is fixed", warning);
    }

    let sheets = GoogleSheetsConnector::new(&config).context("failed to build Google Sheets client")?;
    let app = app(AppState::new(config.clone(), Arc::new(sheets)));

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(
        "Sheet sync listening on http://{}{}",
        bind_addr,
        config.server.sync_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
