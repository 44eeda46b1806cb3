//! API route table.

use axum::Router;
use axum::routing::{get, put};

use pumphouse_engine::ports::{AuditQuery, AuditSink, SensorFeed, SettingsStore};

use crate::state::AppState;

pub mod audit;
pub mod sensors;
pub mod settings;
pub mod sse;

/// Routes mounted under `/api`.
pub fn routes<SS, SF, AQ, AS>() -> Router<AppState<SS, SF, AQ, AS>>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    Router::new()
        .route("/settings", get(settings::get_settings))
        .route("/settings/modes/{strategy}", put(settings::set_mode))
        .route("/settings/schedule", put(settings::set_schedule))
        .route("/settings/thresholds", put(settings::set_thresholds))
        .route("/sensors", get(sensors::latest))
        .route("/audit", get(audit::recent))
        .route("/events/stream", get(sse::stream))
}
