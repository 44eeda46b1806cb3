//! Sensor endpoint — the latest snapshot per channel.

use axum::Json;
use axum::extract::State;

use pumphouse_domain::sensor::SensorSnapshot;
use pumphouse_engine::ports::{AuditQuery, AuditSink, SensorFeed, SettingsStore};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/sensors` — latest reading per channel.
///
/// Channels with no sample yet are `null`.
pub async fn latest<SS, SF, AQ, AS>(
    State(state): State<AppState<SS, SF, AQ, AS>>,
) -> Result<Json<SensorSnapshot>, ApiError>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    let snapshot = state.sensors.snapshot().await?;
    Ok(Json(snapshot))
}
