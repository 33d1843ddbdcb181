// Expense Tracker - Web Server
// REST API with Axum over a single SQLite connection

use anyhow::{Context, Result};
use clap::Parser;
use expense_tracker::api::router;
use expense_tracker::config::{init_logging, ServerConfig};
use expense_tracker::{ExpenseTracker, SqliteStore};
use std::sync::Arc;
use tracing::info;

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available: serve until the process is killed
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_filter);

    // Opened once, shared by every request for the life of the process
    let store = SqliteStore::open(&config.database)?;
    let tracker = ExpenseTracker::new(Arc::new(store));

    let app = router(tracker);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, database = %config.database.display(), "expense server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}
