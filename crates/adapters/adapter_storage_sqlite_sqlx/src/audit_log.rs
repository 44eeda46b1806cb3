//! `SQLite` implementation of the audit-log ports.

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use pumphouse_domain::audit::AuditRecord;
use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::id::AuditRecordId;
use pumphouse_domain::pump::PumpState;
use pumphouse_domain::strategy::Strategy;
use pumphouse_engine::ports::{AuditQuery, AuditSink};

use crate::error::StorageError;

struct Wrapper(AuditRecord);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let strategy: String = row.try_get("strategy")?;
        let status: String = row.try_get("status")?;
        let action: String = row.try_get("action")?;
        let predicted_ml: Option<f64> = row.try_get("predicted_ml")?;
        let duration_secs: Option<f64> = row.try_get("duration_secs")?;
        let timestamp: String = row.try_get("timestamp")?;

        let strategy =
            Strategy::from_str(&strategy).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let status =
            PumpState::from_str(&status).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(AuditRecord {
            id: AuditRecordId::from_uuid(id),
            strategy,
            status,
            action,
            predicted_ml,
            duration_secs,
            timestamp,
        }))
    }
}

/// `SQLite`-backed append-only audit log.
pub struct SqliteAuditLog {
    pool: SqlitePool,
}

impl SqliteAuditLog {
    /// Create a new log backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AuditSink for SqliteAuditLog {
    async fn append(&self, record: AuditRecord) -> Result<(), PumphouseError> {
        sqlx::query(
            "INSERT INTO audit_log (id, strategy, status, action, predicted_ml, duration_secs, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_uuid())
        .bind(record.strategy.to_string())
        .bind(record.status.to_string())
        .bind(&record.action)
        .bind(record.predicted_ml)
        .bind(record.duration_secs)
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }
}

impl AuditQuery for SqliteAuditLog {
    async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>, PumphouseError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM audit_log ORDER BY timestamp DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use chrono::TimeDelta;

    async fn log() -> SqliteAuditLog {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteAuditLog::new(db.pool().clone())
    }

    fn record(action: &str, at: pumphouse_domain::time::Timestamp) -> AuditRecord {
        AuditRecord::builder()
            .strategy(Strategy::Predictive)
            .status(PumpState::On)
            .action(action)
            .predicted_ml(90.0)
            .duration_secs(30.0)
            .timestamp(at)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_roundtrip_record_through_the_table() {
        let log = log().await;
        let ts = "2025-06-02T12:00:00Z".parse().unwrap();
        let original = record("predicted dose of 90 ml", ts);
        log.append(original.clone()).await.unwrap();

        let loaded = log.recent(10).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, original.id);
        assert_eq!(loaded[0].strategy, Strategy::Predictive);
        assert_eq!(loaded[0].status, PumpState::On);
        assert_eq!(loaded[0].action, "predicted dose of 90 ml");
        assert_eq!(loaded[0].predicted_ml, Some(90.0));
        assert_eq!(loaded[0].timestamp, ts);
    }

    #[tokio::test]
    async fn should_return_newest_records_first() {
        let log = log().await;
        let t0: pumphouse_domain::time::Timestamp = "2025-06-02T12:00:00Z".parse().unwrap();
        for i in 0..5 {
            log.append(record(&format!("entry {i}"), t0 + TimeDelta::seconds(i)))
                .await
                .unwrap();
        }

        let loaded = log.recent(3).await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].action, "entry 4");
        assert_eq!(loaded[1].action, "entry 3");
        assert_eq!(loaded[2].action, "entry 2");
    }

    #[tokio::test]
    async fn should_return_empty_list_when_log_is_empty() {
        let log = log().await;
        assert!(log.recent(10).await.unwrap().is_empty());
    }
}
