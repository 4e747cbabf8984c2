//! Application log records.
//!
//! The `logging` table mirrors the process's log stream so a net's history
//! can be reviewed next to its check-ins.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};

/// A log record to append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLogEntry {
    /// Numeric severity (10 debug, 20 info, 30 warning, 40 error)
    pub level: i64,
    /// Severity name, e.g. `INFO`
    pub level_name: String,
    /// Rendered message
    pub message: String,
    /// When the event was emitted
    pub created_at: DateTime<Utc>,
    /// Source identity (the event target)
    pub created_by: String,
    /// Error text attached to the event, if any
    pub execution_info: Option<String>,
    /// Module the event came from
    pub function_name: Option<String>,
    /// `file:line` the event came from
    pub file_name: Option<String>,
}

/// A stored log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Row id
    pub id: i64,
    /// The record as appended
    #[serde(flatten)]
    pub entry: NewLogEntry,
}

/// Append a log record.
///
/// # Errors
/// Returns `DatabaseError` if the insert fails.
pub async fn insert_log(pool: &Pool<Sqlite>, entry: &NewLogEntry) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO logging (log_level, log_levelname, log, created_at, created_by,
                              execution_info, function_name, file_name)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.level)
    .bind(&entry.level_name)
    .bind(&entry.message)
    .bind(entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
    .bind(&entry.created_by)
    .bind(&entry.execution_info)
    .bind(&entry.function_name)
    .bind(&entry.file_name)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// The most recent `limit` log records, newest first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a timestamp cannot be decoded.
pub async fn recent(pool: &Pool<Sqlite>, limit: u32) -> Result<Vec<LogEntry>> {
    let rows = sqlx::query(
        "SELECT id, log_level, log_levelname, log, created_at, created_by,
                execution_info, function_name, file_name
         FROM logging
         ORDER BY id DESC
         LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let created_at: String = row.try_get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DatabaseError::Decode(format!("invalid created_at '{created_at}': {e}")))?;

        entries.push(LogEntry {
            id: row.try_get("id")?,
            entry: NewLogEntry {
                level: row.try_get("log_level")?,
                level_name: row.try_get("log_levelname")?,
                message: row.try_get("log")?,
                created_at,
                created_by: row.try_get("created_by")?,
                execution_info: row.try_get("execution_info")?,
                function_name: row.try_get("function_name")?,
                file_name: row.try_get("file_name")?,
            },
        });
    }

    Ok(entries)
}
