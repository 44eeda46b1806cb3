//! Shared application state for axum handlers.

use std::sync::Arc;

use pumphouse_engine::event_bus::PumpEventBus;
use pumphouse_engine::ports::{AuditQuery, AuditSink, SensorFeed, SettingsStore};
use pumphouse_engine::trigger::TriggerHandle;

/// Application state shared across all axum handlers.
///
/// Generic over the port implementations to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do
/// not need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<SS, SF, AQ, AS> {
    /// Control-settings document.
    pub settings: Arc<SS>,
    /// Latest sensor values.
    pub sensors: Arc<SF>,
    /// Read side of the audit log.
    pub audit_query: Arc<AQ>,
    /// Write side of the audit log, for user-action records.
    pub audit_sink: Arc<AS>,
    /// Live pump events for the SSE stream.
    pub events: Arc<PumpEventBus>,
    /// Wakes the engine after settings mutations.
    pub triggers: TriggerHandle,
}

impl<SS, SF, AQ, AS> Clone for AppState<SS, SF, AQ, AS> {
    fn clone(&self) -> Self {
        Self {
            settings: Arc::clone(&self.settings),
            sensors: Arc::clone(&self.sensors),
            audit_query: Arc::clone(&self.audit_query),
            audit_sink: Arc::clone(&self.audit_sink),
            events: Arc::clone(&self.events),
            triggers: self.triggers.clone(),
        }
    }
}

impl<SS, SF, AQ, AS> AppState<SS, SF, AQ, AS>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    /// Create a new application state from port implementations.
    pub fn new(
        settings: SS,
        sensors: SF,
        audit_query: AQ,
        audit_sink: AS,
        events: Arc<PumpEventBus>,
        triggers: TriggerHandle,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            sensors: Arc::new(sensors),
            audit_query: Arc::new(audit_query),
            audit_sink: Arc::new(audit_sink),
            events,
            triggers,
        }
    }
}
