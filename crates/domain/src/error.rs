//! Common error types used across the workspace.
//!
//! The decision layer treats every error here as a reason to stay idle:
//! the pump never fires on uncertain input. Adapters define their own
//! typed errors and convert into [`PumphouseError`] at the port boundary.

use crate::sensor::SensorChannel;

/// Top-level error for the pumphouse engine and its ports.
#[derive(Debug, thiserror::Error)]
pub enum PumphouseError {
    /// No control settings document exists yet.
    #[error("no control settings document")]
    ConfigMissing,

    /// A strategy needed a sensor channel that has no value.
    #[error("sensor channel {0} has no value")]
    SensorUnavailable(SensorChannel),

    /// The prediction oracle failed to produce a volume.
    #[error("prediction oracle failed")]
    Oracle(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Sending a pump command over the actuator channel failed.
    #[error("actuator send failed")]
    ActuatorSend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A storage adapter failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),
}

impl PumphouseError {
    /// Wrap an oracle error.
    pub fn oracle(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Oracle(Box::new(err))
    }

    /// Wrap an actuator transport error.
    pub fn actuator_send(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ActuatorSend(Box::new(err))
    }

    /// Wrap a storage adapter error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Violations of domain invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A time of day was not a valid `HH:MM` string.
    #[error("time of day must be HH:MM, got {0:?}")]
    BadTimeOfDay(String),

    /// A schedule entry selects no days of the week.
    #[error("schedule entry selects no days of the week")]
    EmptyDays,

    /// An audit record carries no action text.
    #[error("audit action must not be empty")]
    EmptyAction,

    /// A strategy name did not match any known strategy.
    #[error("unknown strategy {0:?}")]
    UnknownStrategy(String),

    /// A pump state was neither `on` nor `off`.
    #[error("unknown pump state {0:?}")]
    UnknownPumpState(String),
}
