//! Settings endpoints — read the document, toggle modes, set the
//! schedule and thresholds.
//!
//! Every mutation appends a user-action audit record and wakes the
//! engine, so a freshly enabled mode takes effect immediately instead of
//! waiting for the next tick.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use pumphouse_domain::audit::AuditRecord;
use pumphouse_domain::pump::PumpState;
use pumphouse_domain::settings::{ControlSettings, ScheduleEntry, Thresholds};
use pumphouse_domain::strategy::Strategy;
use pumphouse_engine::ports::{AuditQuery, AuditSink, SensorFeed, SettingsStore};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/settings` — the current settings document.
///
/// Responds `404` until the document has been created by a first
/// mutation.
pub async fn get_settings<SS, SF, AQ, AS>(
    State(state): State<AppState<SS, SF, AQ, AS>>,
) -> Result<Json<ControlSettings>, ApiError>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    let settings = state
        .settings
        .get()
        .await?
        .ok_or(pumphouse_domain::error::PumphouseError::ConfigMissing)?;
    Ok(Json(settings))
}

/// Body of a mode toggle.
#[derive(Debug, Deserialize)]
pub struct SetModeBody {
    pub enabled: bool,
}

/// `PUT /api/settings/modes/{strategy}` — flip one mode's enabled flag.
pub async fn set_mode<SS, SF, AQ, AS>(
    State(state): State<AppState<SS, SF, AQ, AS>>,
    Path(strategy): Path<String>,
    Json(body): Json<SetModeBody>,
) -> Result<Json<ControlSettings>, ApiError>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    let strategy: Strategy = strategy
        .parse()
        .map_err(pumphouse_domain::error::PumphouseError::Validation)?;
    let updated = state.settings.set_mode_enabled(strategy, body.enabled).await?;

    let status = if body.enabled {
        PumpState::On
    } else {
        PumpState::Off
    };
    let record = AuditRecord::builder()
        .strategy(strategy)
        .status(status)
        .action(format!("user toggled {strategy} to {status}"))
        .build()?;
    state.audit_sink.append(record).await?;

    state.triggers.settings_changed().await;
    Ok(Json(updated))
}

/// `PUT /api/settings/schedule` — replace the schedule entries.
pub async fn set_schedule<SS, SF, AQ, AS>(
    State(state): State<AppState<SS, SF, AQ, AS>>,
    Json(entries): Json<Vec<ScheduleEntry>>,
) -> Result<Json<ControlSettings>, ApiError>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    let updated = state.settings.set_schedule(entries).await?;
    state.triggers.settings_changed().await;
    Ok(Json(updated))
}

/// `PUT /api/settings/thresholds` — replace the environment thresholds.
pub async fn set_thresholds<SS, SF, AQ, AS>(
    State(state): State<AppState<SS, SF, AQ, AS>>,
    Json(thresholds): Json<Thresholds>,
) -> Result<Json<ControlSettings>, ApiError>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    let updated = state.settings.set_thresholds(thresholds).await?;
    state.triggers.settings_changed().await;
    Ok(Json(updated))
}
