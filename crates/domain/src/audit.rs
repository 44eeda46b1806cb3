//! Audit records — append-only start/stop log entries.

use serde::{Deserialize, Serialize};

use crate::error::{PumphouseError, ValidationError};
use crate::id::AuditRecordId;
use crate::pump::PumpState;
use crate::strategy::Strategy;
use crate::time::Timestamp;

/// One append-only entry in the pump audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditRecordId,
    /// Strategy (or mode, for user toggles) the entry belongs to.
    pub strategy: Strategy,
    /// Resulting state: `on` for starts/enables, `off` for stops/disables.
    pub status: PumpState,
    /// Human-readable description of what happened.
    pub action: String,
    /// Oracle-predicted volume, for predictive doses.
    pub predicted_ml: Option<f64>,
    /// Planned actuation duration in seconds, for timed doses.
    pub duration_secs: Option<f64>,
    pub timestamp: Timestamp,
}

impl AuditRecord {
    /// Create a builder for constructing an [`AuditRecord`].
    #[must_use]
    pub fn builder() -> AuditRecordBuilder {
        AuditRecordBuilder::default()
    }
}

/// Step-by-step builder for [`AuditRecord`].
#[derive(Debug, Default)]
pub struct AuditRecordBuilder {
    id: Option<AuditRecordId>,
    strategy: Option<Strategy>,
    status: Option<PumpState>,
    action: Option<String>,
    predicted_ml: Option<f64>,
    duration_secs: Option<f64>,
    timestamp: Option<Timestamp>,
}

impl AuditRecordBuilder {
    #[must_use]
    pub fn id(mut self, id: AuditRecordId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn status(mut self, status: PumpState) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn predicted_ml(mut self, volume: f64) -> Self {
        self.predicted_ml = Some(volume);
        self
    }

    #[must_use]
    pub fn duration_secs(mut self, seconds: f64) -> Self {
        self.duration_secs = Some(seconds);
        self
    }

    #[must_use]
    pub fn timestamp(mut self, ts: Timestamp) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`AuditRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`PumphouseError::Validation`] when the action text is empty.
    pub fn build(self) -> Result<AuditRecord, PumphouseError> {
        let record = AuditRecord {
            id: self.id.unwrap_or_default(),
            strategy: self.strategy.unwrap_or(Strategy::Manual),
            status: self.status.unwrap_or(PumpState::Off),
            action: self.action.unwrap_or_default(),
            predicted_ml: self.predicted_ml,
            duration_secs: self.duration_secs,
            timestamp: self.timestamp.unwrap_or_else(crate::time::now),
        };
        if record.action.is_empty() {
            return Err(ValidationError::EmptyAction.into());
        }
        Ok(record)
    }
}
