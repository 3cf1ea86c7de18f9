//! Duck Games API server.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/clicker`) for the shared real-time
//!   clicker, backed by [`clicker_core::ClickerHub`]
//! - **Leaderboard REST endpoints** (`GET`/`POST /leaderboard`) backed by
//!   `SQLite` via [`clicker_db`]
//! - **Status endpoint** (`GET /api/status`) with the live counter value
//!   and connection count
//!
//! # Architecture
//!
//! One [`ClickerHub`](clicker_core::ClickerHub) is built in `main` and
//! shared through [`AppState`]. Each `WebSocket` session registers a
//! connection with the hub, forwards clicks to it, and drains the values
//! the hub queues for it. The clicker state lives in memory only; a
//! restart resets the counter to zero. The leaderboard is independent
//! and persistent.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{ClickerConfig, ConfigError, ServerConfig};
pub use router::build_router;
pub use server::{ServerError, serve, start_server};
pub use state::AppState;
