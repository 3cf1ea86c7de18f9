//! Leaderboard score storage.
//!
//! Scores are append-only. Reads return the best scores first; ties go
//! to whoever submitted earlier.

use crate::error::DbError;

/// Number of entries returned by a leaderboard read unless told otherwise.
pub const DEFAULT_TOP_LIMIT: u32 = 5;

/// A row from the `scores` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ScoreRow {
    /// Auto-increment row id (submission order).
    pub id: i64,
    /// Player name as submitted.
    pub name: String,
    /// The score.
    pub score: i64,
}

/// Operations on the `scores` table.
pub struct LeaderboardStore<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> LeaderboardStore<'a> {
    /// Create a new leaderboard store bound to a connection pool.
    pub const fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a score. Returns the new row id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the insert fails.
    pub async fn insert(&self, name: &str, score: i64) -> Result<i64, DbError> {
        let result = sqlx::query(
            r"INSERT INTO scores (name, score)
              VALUES (?, ?)",
        )
        .bind(name)
        .bind(score)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, name, score, "Inserted score");
        Ok(id)
    }

    /// The best `limit` scores, highest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn top(&self, limit: u32) -> Result<Vec<ScoreRow>, DbError> {
        let rows = sqlx::query_as::<_, ScoreRow>(
            r"SELECT id, name, score
              FROM scores
              ORDER BY score DESC, id ASC
              LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
