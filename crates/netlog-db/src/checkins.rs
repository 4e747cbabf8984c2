//! Check-in operations.
//!
//! This module provides append and read-back operations for the `checkins`
//! table, which holds one row per operator check-in on a net.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use netlog_core::OperatorRecord;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Append a check-in record.
///
/// The row is written by a single `INSERT`, so a task abandoned mid-way never
/// leaves a partial check-in behind. The check-in time is stored as fixed-width
/// RFC 3339 in UTC with microsecond precision so it sorts as text.
///
/// # Errors
/// Returns `DatabaseError` if the insert fails.
pub async fn insert_checkin(pool: &Pool<Sqlite>, record: &OperatorRecord) -> Result<i64> {
    let expiration_date = record
        .expiration_date
        .map(|date| date.format(DATE_FORMAT).to_string());

    let result = sqlx::query(
        "INSERT INTO checkins (call_sign, full_name, address, city, province, postal_code,
                               qualifications, status, expiration_date, frn,
                               checkin_date, repeater)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.call_sign)
    .bind(&record.full_name)
    .bind(&record.address)
    .bind(&record.city)
    .bind(&record.province)
    .bind(&record.postal_code)
    .bind(&record.qualifications)
    .bind(&record.status)
    .bind(expiration_date)
    .bind(&record.frn)
    .bind(record.checkin_date.to_rfc3339_opts(SecondsFormat::Micros, true))
    .bind(&record.repeater)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(call_sign = %record.call_sign, id, "Check-in stored");
    Ok(id)
}

/// Get a check-in by its row id.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a stored value cannot be decoded.
pub async fn get_by_id(pool: &Pool<Sqlite>, id: i64) -> Result<Option<OperatorRecord>> {
    let row = sqlx::query(
        "SELECT call_sign, full_name, address, city, province, postal_code,
                qualifications, status, expiration_date, frn, checkin_date, repeater
         FROM checkins
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// All check-ins on a repeater, newest first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a stored value cannot be decoded.
pub async fn list_for_repeater(
    pool: &Pool<Sqlite>,
    repeater: &str,
) -> Result<Vec<OperatorRecord>> {
    let rows = sqlx::query(
        "SELECT call_sign, full_name, address, city, province, postal_code,
                qualifications, status, expiration_date, frn, checkin_date, repeater
         FROM checkins
         WHERE repeater = ?
         ORDER BY checkin_date DESC, id DESC",
    )
    .bind(repeater)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Total number of stored check-ins.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM checkins")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn record_from_row(row: &SqliteRow) -> Result<OperatorRecord> {
    let expiration_date: Option<String> = row.try_get("expiration_date")?;
    let expiration_date = expiration_date
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|e| DatabaseError::Decode(format!("invalid expiration_date '{s}': {e}")))
        })
        .transpose()?;

    let checkin_date: String = row.try_get("checkin_date")?;
    let checkin_date = DateTime::parse_from_rfc3339(&checkin_date)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::Decode(format!("invalid checkin_date '{checkin_date}': {e}"))
        })?;

    Ok(OperatorRecord {
        call_sign: row.try_get("call_sign")?,
        full_name: row.try_get("full_name")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        province: row.try_get("province")?,
        postal_code: row.try_get("postal_code")?,
        qualifications: row.try_get("qualifications")?,
        status: row.try_get("status")?,
        expiration_date,
        frn: row.try_get("frn")?,
        repeater: row.try_get("repeater")?,
        checkin_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::{Duration, TimeZone};

    async fn setup_test_db() -> Database {
        Database::open(":memory:").await.expect("open database")
    }

    fn bare(call_sign: &str, repeater: &str, checkin_date: DateTime<Utc>) -> OperatorRecord {
        OperatorRecord {
            call_sign: call_sign.to_string(),
            full_name: String::new(),
            address: None,
            city: None,
            province: None,
            postal_code: None,
            qualifications: None,
            status: None,
            expiration_date: None,
            frn: None,
            repeater: repeater.to_string(),
            checkin_date,
        }
    }

    fn found(checkin_date: DateTime<Utc>) -> OperatorRecord {
        OperatorRecord {
            full_name: "DOE, JOHN Q".to_string(),
            address: Some("12 ELM ST".to_string()),
            city: Some("SPRINGFIELD".to_string()),
            province: Some("Illinois".to_string()),
            postal_code: Some("62701".to_string()),
            qualifications: Some("Extra - Group A".to_string()),
            status: Some("Active".to_string()),
            expiration_date: NaiveDate::from_ymd_opt(2031, 3, 14),
            frn: Some("0012345678".to_string()),
            ..bare("K1ABC", "VE7RVF", checkin_date)
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = setup_test_db().await;
        let record = found(Utc.with_ymd_and_hms(2024, 5, 1, 19, 30, 0).unwrap());

        let id = insert_checkin(db.pool(), &record).await.unwrap();
        let stored = get_by_id(db.pool(), id).await.unwrap().expect("stored row");

        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_bare_record_round_trips_nulls() {
        let db = setup_test_db().await;
        let record = bare("1234", "VE7RVF", Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap());

        let id = insert_checkin(db.pool(), &record).await.unwrap();
        let stored = get_by_id(db.pool(), id).await.unwrap().expect("stored row");

        assert!(stored.is_bare());
        assert_eq!(stored.call_sign, "1234");
    }

    #[tokio::test]
    async fn test_get_missing_id() {
        let db = setup_test_db().await;
        assert_eq!(get_by_id(db.pool(), 42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_for_repeater_newest_first() {
        let db = setup_test_db().await;
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap();

        insert_checkin(db.pool(), &bare("VE7AAA", "VE7RVF", start))
            .await
            .unwrap();
        insert_checkin(db.pool(), &bare("VE7BBB", "VE7RVF", start + Duration::minutes(2)))
            .await
            .unwrap();
        insert_checkin(db.pool(), &bare("VE7CCC", "VE7NSR", start + Duration::minutes(1)))
            .await
            .unwrap();

        let signs: Vec<String> = list_for_repeater(db.pool(), "VE7RVF")
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.call_sign)
            .collect();
        assert_eq!(signs, vec!["VE7BBB", "VE7AAA"]);
        assert_eq!(count(db.pool()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let db = setup_test_db().await;
        let now = Utc::now();
        let first = insert_checkin(db.pool(), &bare("VA7AAA", "VE7RVF", now))
            .await
            .unwrap();
        let second = insert_checkin(db.pool(), &bare("VA7AAA", "VE7RVF", now))
            .await
            .unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_undecodable_checkin_date() {
        let db = setup_test_db().await;
        sqlx::query(
            "INSERT INTO checkins (call_sign, full_name, checkin_date, repeater)
             VALUES ('VE7ABC', '', 'yesterday', 'VE7RVF')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = list_for_repeater(db.pool(), "VE7RVF").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Decode(_)));
    }
}
