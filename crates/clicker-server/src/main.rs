//! Duck Games API server binary.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `clicker-config.yaml` + environment
//! 3. Open the leaderboard database and run migrations
//! 4. Build the clicker hub (counter starts at zero)
//! 5. Serve HTTP + `WebSocket` until `Ctrl-C`
//! 6. Close the database pool

use std::sync::Arc;

use clicker_core::ClickerHub;
use clicker_db::SqlitePool;
use clicker_server::{AppState, ClickerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("clicker-server starting");

    // 2. Load configuration.
    let config = ClickerConfig::load()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        database_url = config.database.url,
        ws_idle_timeout_secs = config.server.ws_idle_timeout_secs,
        "Configuration loaded"
    );

    // 3. Leaderboard database.
    let db = SqlitePool::connect(&config.database.to_sqlite_config()).await?;
    db.run_migrations().await?;

    // 4. Clicker hub.
    let hub = Arc::new(ClickerHub::new());
    let state = Arc::new(AppState::from_config(hub, db.clone(), &config));

    // 5. Serve.
    clicker_server::start_server(&config.server, state).await?;

    // 6. Shut down.
    db.close().await;
    info!("clicker-server shutdown complete");

    Ok(())
}
