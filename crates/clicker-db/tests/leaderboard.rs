//! Tests for the leaderboard store.
//!
//! Each test runs against its own private in-memory `SQLite` database,
//! so no external services are needed.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use clicker_db::{DEFAULT_TOP_LIMIT, DbError, LeaderboardStore, SqliteConfig, SqlitePool};

async fn setup() -> SqlitePool {
    let pool = SqlitePool::connect(&SqliteConfig::in_memory())
        .await
        .expect("Failed to open in-memory SQLite");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    pool
}

#[tokio::test]
async fn empty_leaderboard() {
    let pool = setup().await;
    let store = LeaderboardStore::new(pool.pool());

    assert!(store.top(DEFAULT_TOP_LIMIT).await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_then_read_back() {
    let pool = setup().await;
    let store = LeaderboardStore::new(pool.pool());

    let id = store.insert("Donald", 42).await.unwrap();
    assert!(id > 0);

    let rows = store.top(DEFAULT_TOP_LIMIT).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Donald");
    assert_eq!(rows[0].score, 42);
    assert_eq!(rows[0].id, id);
}

#[tokio::test]
async fn top_is_ordered_and_limited() {
    let pool = setup().await;
    let store = LeaderboardStore::new(pool.pool());

    for (name, score) in [
        ("a", 10),
        ("b", 70),
        ("c", 30),
        ("d", 90),
        ("e", 50),
        ("f", 20),
        ("g", 80),
    ] {
        store.insert(name, score).await.unwrap();
    }

    let rows = store.top(DEFAULT_TOP_LIMIT).await.unwrap();
    let scores: Vec<i64> = rows.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![90, 80, 70, 50, 30]);
    assert_eq!(store.top(100).await.unwrap().len(), 7);

    let top_two = store.top(2).await.unwrap();
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[0].name, "d");
}

#[tokio::test]
async fn ties_go_to_earlier_submission() {
    let pool = setup().await;
    let store = LeaderboardStore::new(pool.pool());

    store.insert("first", 100).await.unwrap();
    store.insert("second", 100).await.unwrap();

    let rows = store.top(DEFAULT_TOP_LIMIT).await.unwrap();
    assert_eq!(rows[0].name, "first");
    assert_eq!(rows[1].name, "second");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let pool = setup().await;
    pool.run_migrations().await.unwrap();

    let store = LeaderboardStore::new(pool.pool());
    store.insert("x", 1).await.unwrap();
    assert_eq!(store.top(DEFAULT_TOP_LIMIT).await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_url_is_config_error() {
    let result = SqlitePool::connect(&SqliteConfig::new("sqlite://games.db?mode=bogus")).await;
    assert!(matches!(result, Err(DbError::Config(_))));
}

#[tokio::test]
async fn existing_scores_table_is_adopted() {
    let pool = SqlitePool::connect(&SqliteConfig::in_memory()).await.unwrap();

    // A games.db written before migrations existed already has this table
    // and some scores in it.
    sqlx::query(
        r"CREATE TABLE scores (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              name TEXT NOT NULL,
              score INTEGER NOT NULL)",
    )
    .execute(pool.pool())
    .await
    .unwrap();
    sqlx::query("INSERT INTO scores (name, score) VALUES ('old', 40)")
        .execute(pool.pool())
        .await
        .unwrap();

    pool.run_migrations().await.unwrap();

    let store = LeaderboardStore::new(pool.pool());
    store.insert("new", 60).await.unwrap();

    let rows = store.top(DEFAULT_TOP_LIMIT).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["new", "old"]);
}
