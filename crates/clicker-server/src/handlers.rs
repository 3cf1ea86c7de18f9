//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Liveness message |
//! | `GET` | `/leaderboard` | Top scores, highest first |
//! | `POST` | `/leaderboard` | Submit a score |
//! | `GET` | `/api/status` | Clicker counter and live connection count |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use clicker_db::LeaderboardStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Longest accepted player name, in characters.
pub const MAX_NAME_CHARS: usize = 64;

/// A leaderboard entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player name.
    pub name: String,
    /// The score.
    pub score: i64,
}

/// Body of `POST /leaderboard`.
#[derive(Debug, Deserialize)]
pub struct SubmitScore {
    /// Player name.
    pub name: String,
    /// The score.
    pub score: i64,
}

/// Body of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Current clicker counter value.
    pub count: u64,
    /// Number of registered clicker connections.
    pub connections: usize,
}

/// `GET /`
pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Duck Games API is running" }))
}

/// `GET /leaderboard`
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let rows = LeaderboardStore::new(state.db.pool())
        .top(state.top_limit)
        .await?;

    let entries = rows
        .into_iter()
        .map(|row| LeaderboardEntry {
            name: row.name,
            score: row.score,
        })
        .collect();

    Ok(Json(entries))
}

/// `POST /leaderboard`
///
/// The name is trimmed before it is stored.
pub async fn add_score(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitScore>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let name = validate_name(&body.name)?;
    if body.score < 0 {
        return Err(ApiError::InvalidScore(String::from("score must not be negative")));
    }

    LeaderboardStore::new(state.db.pool())
        .insert(name, body.score)
        .await?;
    tracing::info!(name, score = body.score, "Score added");

    Ok(Json(serde_json::json!({ "message": "Score added" })))
}

/// `GET /api/status`
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        count: state.hub.counter().current(),
        connections: state.hub.registry().len().await,
    })
}

fn validate_name(raw: &str) -> Result<&str, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidScore(String::from("name must not be empty")));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::InvalidScore(format!(
            "name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name)
}
