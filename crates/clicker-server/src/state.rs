//! Shared application state for the Duck Games API server.
//!
//! [`AppState`] carries the [`ClickerHub`] (counter + live connections),
//! the leaderboard database pool, and the per-session settings. It is
//! built once in `main`, wrapped in [`Arc`], and injected via Axum's
//! `State` extractor. There is no global.

use std::sync::Arc;
use std::time::Duration;

use clicker_core::{ClickerHub, DEFAULT_OUTBOUND_CAPACITY};
use clicker_db::{DEFAULT_TOP_LIMIT, SqlitePool};

use crate::config::ClickerConfig;

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// The clicker hub shared by every WebSocket session.
    pub hub: Arc<ClickerHub>,
    /// Leaderboard database pool. The clicker never uses it.
    pub db: SqlitePool,
    /// Outbound queue capacity for each clicker session.
    pub outbound_buffer: usize,
    /// Close sessions that send nothing for this long.
    pub idle_timeout: Option<Duration>,
    /// Number of entries returned by `GET /leaderboard`.
    pub top_limit: u32,
}

impl AppState {
    /// Create application state with default session settings.
    pub fn new(hub: Arc<ClickerHub>, db: SqlitePool) -> Self {
        Self {
            hub,
            db,
            outbound_buffer: DEFAULT_OUTBOUND_CAPACITY,
            idle_timeout: None,
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }

    /// Create application state with settings taken from configuration.
    pub fn from_config(hub: Arc<ClickerHub>, db: SqlitePool, config: &ClickerConfig) -> Self {
        Self {
            hub,
            db,
            outbound_buffer: config.server.outbound_buffer,
            idle_timeout: config.server.idle_timeout(),
            top_limit: config.leaderboard.top_limit,
        }
    }
}
