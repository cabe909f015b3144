// Account Ledger - Web Server
// REST API with Axum over the SQLite ledger

use anyhow::{Context, Result};
use ledger_api::{logging::init_logging, open_database, router, Config, Ledger};
use tracing::info;

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config);

    info!(version = ledger_api::VERSION, "starting ledger server");

    // Open database
    let conn = open_database(&config.database_path)?;
    info!(path = ?config.database_path, "database opened");

    let ledger = Ledger::new(conn, config.reference_mode);
    if let Some(account) = ledger
        .ensure_account(config.initial_balance)
        .context("Failed to prepare account")?
    {
        info!(balance = %account.balance, "account ready");
    }

    let app = router(ledger);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}
