//! `SQLite` implementation of [`SettingsStore`].
//!
//! The whole document lives in one JSON payload row; mutations are
//! read-modify-write against that row, so a missing document starts from
//! [`ControlSettings::default`].

use sqlx::SqlitePool;

use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::settings::{ControlSettings, ScheduleEntry, Thresholds};
use pumphouse_domain::strategy::Strategy;
use pumphouse_engine::ports::SettingsStore;

use crate::error::StorageError;

/// `SQLite`-backed control-settings store.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load(&self) -> Result<Option<ControlSettings>, StorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM control_settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;
        row.map(|(payload,)| serde_json::from_str(&payload))
            .transpose()
            .map_err(StorageError::from)
    }

    async fn save(&self, settings: &ControlSettings) -> Result<(), StorageError> {
        let payload = serde_json::to_string(settings)?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO control_settings (id, payload, updated_at) VALUES (1, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(&payload)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_with(
        &self,
        mutate: impl FnOnce(&mut ControlSettings) + Send,
    ) -> Result<ControlSettings, PumphouseError> {
        let mut settings = self.load().await.map_err(PumphouseError::from)?.unwrap_or_default();
        mutate(&mut settings);
        self.save(&settings).await.map_err(PumphouseError::from)?;
        Ok(settings)
    }
}

impl SettingsStore for SqliteSettingsStore {
    async fn get(&self) -> Result<Option<ControlSettings>, PumphouseError> {
        self.load().await.map_err(PumphouseError::from)
    }

    async fn set_mode_enabled(
        &self,
        strategy: Strategy,
        enabled: bool,
    ) -> Result<ControlSettings, PumphouseError> {
        self.update_with(|settings| settings.set_mode_enabled(strategy, enabled))
            .await
    }

    async fn set_schedule(
        &self,
        entries: Vec<ScheduleEntry>,
    ) -> Result<ControlSettings, PumphouseError> {
        for entry in &entries {
            entry.validate()?;
        }
        self.update_with(|settings| settings.scheduled.entries = entries)
            .await
    }

    async fn set_thresholds(
        &self,
        thresholds: Thresholds,
    ) -> Result<ControlSettings, PumphouseError> {
        self.update_with(|settings| settings.environment.thresholds = thresholds)
            .await
    }
}
