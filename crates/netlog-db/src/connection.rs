//! Database connection management.
//!
//! Opens the `SQLx` `SQLite` pool the check-in and log writers share.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const MEMORY: &str = ":memory:";

/// Open a connection pool for the database at `path`.
///
/// The file (and its parent directory) is created if missing. `:memory:`
/// opens a private in-memory database; it is pinned to a single connection
/// so every query sees the same data.
///
/// # Errors
/// Returns `DatabaseError::Open` if the path is unusable or the first
/// connection cannot be established.
pub async fn open_pool(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path = path.as_ref();
    let path_str = path.to_str().ok_or_else(|| {
        DatabaseError::Open("invalid database path: not valid UTF-8".to_string())
    })?;

    let in_memory = path_str == MEMORY;
    let connect_options = if in_memory {
        SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 5 })
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to open {path_str}: {e}")))?;

    tracing::info!("Database pool created at {}", path_str);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pool() {
        let pool = open_pool(MEMORY).await.expect("open memory pool");
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query");
        assert_eq!(one, 1);
    }

    #[tokio::test]
    async fn test_file_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("checkins.db");

        let pool = open_pool(&path).await.expect("open file pool");
        pool.close().await;

        assert!(path.exists());
    }
}
