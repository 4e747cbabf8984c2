//! Database migration management.
//!
//! Embeds SQL migrations and provides functions to apply them automatically.
//! Uses `SQLx`'s built-in migration support with compile-time embedding.

use crate::error::{DatabaseError, Result};
use sqlx::{Pool, Sqlite};

/// Run all pending database migrations.
///
/// Applied migrations are tracked by `SQLx` in the `_sqlx_migrations` table,
/// so running this against an existing database is a no-op.
///
/// # Errors
/// Returns `DatabaseError::Migration` if any migration fails to execute.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    tracing::debug!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(format!("migration execution failed: {e}")))?;

    tracing::debug!("Database migrations completed successfully");
    Ok(())
}

/// Get the current schema version.
///
/// Returns the highest applied migration version, or 0 when nothing has been
/// applied yet.
///
/// # Errors
/// Returns `DatabaseError` if the migrations table cannot be queried.
pub async fn get_schema_version(pool: &Pool<Sqlite>) -> Result<i64> {
    let table_exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?
        > 0;

    if !table_exists {
        return Ok(0);
    }

    let version =
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(version), 0) FROM _sqlx_migrations")
            .fetch_optional(pool)
            .await?
            .unwrap_or(0);

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::open_pool;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = open_pool(":memory:").await.expect("open pool");

        assert_eq!(get_schema_version(&pool).await.expect("version"), 0);
        run_migrations(&pool).await.expect("run migrations");
        assert_eq!(get_schema_version(&pool).await.expect("version"), 2);

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name"
        )
        .fetch_all(&pool)
        .await
        .expect("query tables");
        assert_eq!(tables, vec!["checkins", "logging"]);

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('logging') ORDER BY cid")
                .fetch_all(&pool)
                .await
                .expect("query columns");
        assert_eq!(
            columns,
            vec![
                "id",
                "log_level",
                "log_levelname",
                "log",
                "created_at",
                "created_by",
                "execution_info",
                "function_name",
                "file_name"
            ]
        );
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = open_pool(":memory:").await.expect("open pool");
        run_migrations(&pool).await.expect("first run");
        run_migrations(&pool).await.expect("second run");
        assert_eq!(get_schema_version(&pool).await.expect("version"), 2);
    }
}
