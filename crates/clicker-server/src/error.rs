//! Error types for the HTTP layer.
//!
//! [`ApiError`] covers the leaderboard endpoints and converts into an
//! Axum response via its [`IntoResponse`] implementation. The clicker
//! socket never reports errors to the client; it just closes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clicker_db::DbError;

/// Errors that can occur in the REST endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The submitted score was rejected.
    #[error("invalid score: {0}")]
    InvalidScore(String),

    /// The leaderboard database failed.
    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidScore(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Database(e) => {
                tracing::error!(error = %e, "Leaderboard database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("leaderboard unavailable"),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
