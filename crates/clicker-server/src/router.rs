//! Axum router construction for the Duck Games API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled so the browser games can call it from
//! any origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- liveness message
/// - `GET /ws/clicker` -- shared clicker `WebSocket`
/// - `GET /leaderboard` -- top scores
/// - `POST /leaderboard` -- submit a score
/// - `GET /api/status` -- clicker counter and connection count
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/clicker", get(ws::ws_clicker))
        // REST API
        .route(
            "/leaderboard",
            get(handlers::get_leaderboard).post(handlers::add_score),
        )
        .route("/api/status", get(handlers::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
