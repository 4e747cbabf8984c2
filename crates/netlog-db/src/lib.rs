//! Netlog Database Layer
//!
//! Provides `SQLite` storage for net check-ins and the application log.
//! Uses `SQLx` with embedded, versioned migrations.
//!
//! # Architecture
//!
//! - **Append-only**: check-ins and log records are only ever inserted
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//! - **Connection Pooling**: many concurrent writers share one pool
//!
//! # Example
//!
//! ```ignore
//! use netlog_db::{checkins, Database};
//!
//! let db = Database::open("checkins.db").await?;
//! let id = checkins::insert_checkin(db.pool(), &record).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod checkins;
pub mod connection;
pub mod error;
pub mod logs;
pub mod migrations;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use logs::{LogEntry, NewLogEntry};

use sqlx::{Pool, Sqlite};
use std::path::Path;

/// High-level database handle.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the database at `path` without touching the schema.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        Ok(Self { pool })
    }

    /// Open the database at `path` and bring its schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::new(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!("Database pool closed");
    }
}
