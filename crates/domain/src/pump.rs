//! Pump commands and the transient in-flight operation record.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::OperationId;
use crate::strategy::Strategy;
use crate::time::Timestamp;

/// The two idempotent commands the actuator channel accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpState {
    On,
    Off,
}

impl fmt::Display for PumpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

impl FromStr for PumpState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(ValidationError::UnknownPumpState(other.to_string())),
        }
    }
}

/// A pump operation in flight.
///
/// Exists only while the actuation guard holds the busy flag; it is never
/// persisted and does not survive a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct PumpOperation {
    pub id: OperationId,
    pub strategy: Strategy,
    pub started_at: Timestamp,
    /// `None` for indefinite fires (manual toggle, schedule window).
    pub planned_duration: Option<Duration>,
    pub reason: String,
}

impl PumpOperation {
    /// Record the start of an operation.
    #[must_use]
    pub fn new(
        strategy: Strategy,
        planned_duration: Option<Duration>,
        reason: impl Into<String>,
        started_at: Timestamp,
    ) -> Self {
        Self {
            id: OperationId::new(),
            strategy,
            started_at,
            planned_duration,
            reason: reason.into(),
        }
    }

    /// Whether this operation has no planned end.
    #[must_use]
    pub fn is_indefinite(&self) -> bool {
        self.planned_duration.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_display_and_parse_pump_states() {
        assert_eq!(PumpState::On.to_string(), "on");
        assert_eq!("off".parse::<PumpState>().unwrap(), PumpState::Off);
        assert!("standby".parse::<PumpState>().is_err());
    }

    #[test]
    fn should_mark_operations_without_duration_as_indefinite() {
        let op = PumpOperation::new(Strategy::Manual, None, "manual override on", now());
        assert!(op.is_indefinite());

        let dose = PumpOperation::new(
            Strategy::Environment,
            Some(Duration::from_secs(120)),
            "environment threshold held",
            now(),
        );
        assert!(!dose.is_indefinite());
    }

    #[test]
    fn should_assign_unique_operation_ids() {
        let a = PumpOperation::new(Strategy::Manual, None, "x", now());
        let b = PumpOperation::new(Strategy::Manual, None, "x", now());
        assert_ne!(a.id, b.id);
    }
}
