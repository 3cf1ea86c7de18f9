//! Leaderboard persistence for the Duck Games API.
//!
//! Scores live in a single `SQLite` table. This crate owns the connection
//! pool, the embedded migrations, and the insert/query operations. The
//! real-time clicker never touches it.
//!
//! # Modules
//!
//! - [`sqlite`] -- `SQLite` connection pool and configuration
//! - [`leaderboard`] -- Score insertion and top-N queries
//! - [`error`] -- Shared error types

pub mod error;
pub mod leaderboard;
pub mod sqlite;

// Re-export primary types for convenience.
pub use error::DbError;
pub use leaderboard::{DEFAULT_TOP_LIMIT, LeaderboardStore, ScoreRow};
pub use sqlite::{SqliteConfig, SqlitePool};
