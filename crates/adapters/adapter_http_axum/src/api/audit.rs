//! Audit endpoint — recent start/stop records.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use pumphouse_domain::audit::AuditRecord;
use pumphouse_engine::ports::{AuditQuery, AuditSink, SensorFeed, SettingsStore};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;

/// Query parameters for the audit listing.
#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// `GET /api/audit?limit=N` — recent audit records, newest first.
pub async fn recent<SS, SF, AQ, AS>(
    State(state): State<AppState<SS, SF, AQ, AS>>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<AuditRecord>>, ApiError>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let records = state.audit_query.recent(limit).await?;
    Ok(Json(records))
}
