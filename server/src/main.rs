use std::sync::Arc;

use anyhow::{Context, Result};
use todo_server::config::ServerConfig;
use todo_server::postgres::PgStore;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env().context("failed to load configuration")?;
    todo_server::logging::init(config.log_format);
    tracing::info!("todo-server v{}", env!("CARGO_PKG_VERSION"));

    let store = PgStore::connect_lazy(&config.database).context("invalid DATABASE_URL")?;

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;
    tracing::info!(addr = %config.bind, "listening");

    axum::serve(listener, todo_server::app(Arc::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
