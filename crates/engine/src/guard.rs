//! Actuation guard — serializes pump operations and guarantees shutoff.
//!
//! The guard is the single source of truth for "is the pump doing
//! something". All fire attempts are atomic test-and-set against one
//! busy slot, so concurrent triggers never overlap pump commands, and
//! `Started` is never reported twice without an intervening completion.
//!
//! Shutoff discipline: a timed dose always runs its off-path to
//! completion. The OFF command is retried a bounded number of times; if
//! every attempt fails the guard logs a critical error and still clears
//! the busy flag, so the control loop stays responsive.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use pumphouse_domain::audit::AuditRecord;
use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::id::OperationId;
use pumphouse_domain::pump::{PumpOperation, PumpState};
use pumphouse_domain::strategy::Strategy;

use crate::ports::{ActuatorChannel, AuditSink, Clock};

/// Total attempts per pump command (initial send + retries).
pub const SEND_ATTEMPTS: u32 = 3;

/// Fixed backoff between send attempts.
pub const SEND_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Result of a fire attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// The pump was turned on; the id identifies the operation.
    Started(OperationId),
    /// Another operation is in flight; nothing was sent.
    Busy,
}

/// Owns the busy flag and the shutoff timers for the single pump.
pub struct ActuationGuard<A, S, C> {
    actuator: A,
    audit: S,
    clock: C,
    active: Arc<Mutex<Option<PumpOperation>>>,
}

impl<A, S, C> ActuationGuard<A, S, C>
where
    A: ActuatorChannel + Clone + Send + Sync + 'static,
    S: AuditSink + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    /// Create a guard around an actuator channel and an audit sink.
    pub fn new(actuator: A, audit: S, clock: C) -> Self {
        Self {
            actuator,
            audit,
            clock,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Attempt to start a pump operation.
    ///
    /// With a duration, a single-shot shutoff timer is armed; without
    /// one the operation runs until [`stop_indefinite`](Self::stop_indefinite).
    ///
    /// # Errors
    ///
    /// Returns [`PumphouseError::ActuatorSend`] when the ON command fails
    /// after all retries. A best-effort OFF is sent and the busy flag is
    /// cleared before the error is surfaced.
    pub async fn try_fire(
        &self,
        strategy: Strategy,
        duration: Option<Duration>,
        volume_ml: Option<f64>,
        reason: &str,
    ) -> Result<FireOutcome, PumphouseError> {
        let op = PumpOperation::new(strategy, duration, reason, self.clock.now());
        {
            let mut active = self.active.lock().await;
            if let Some(current) = active.as_ref() {
                tracing::debug!(
                    current = %current.strategy,
                    requested = %strategy,
                    "pump busy, fire rejected"
                );
                return Ok(FireOutcome::Busy);
            }
            *active = Some(op.clone());
        }

        if let Err(err) = send_with_retry(&self.actuator, PumpState::On).await {
            // The pump may or may not have latched on; fail safe.
            if let Err(off_err) = self.actuator.send(PumpState::Off).await {
                tracing::error!(
                    error = %off_err,
                    "best-effort off after failed start also failed"
                );
            }
            self.active.lock().await.take();
            return Err(err);
        }

        tracing::info!(
            operation = %op.id,
            strategy = %strategy,
            reason,
            duration_secs = duration.map(|d| d.as_secs_f64()),
            volume_ml,
            "pump on"
        );
        append_best_effort(&self.audit, start_record(&op, volume_ml, &self.clock)).await;

        if let Some(duration) = duration {
            self.arm_shutoff(op.clone(), duration);
        }
        Ok(FireOutcome::Started(op.id))
    }

    /// Stop an in-flight *indefinite* operation.
    ///
    /// Timed doses are not stoppable; they end by natural expiry of their
    /// shutoff timer. Returns `true` when an operation was stopped.
    ///
    /// # Errors
    ///
    /// Returns [`PumphouseError::ActuatorSend`] when every OFF attempt
    /// failed. The busy flag is cleared regardless, so the engine never
    /// wedges.
    pub async fn stop_indefinite(&self, reason: &str) -> Result<bool, PumphouseError> {
        let mut active = self.active.lock().await;
        match active.as_ref() {
            Some(op) if op.is_indefinite() => {}
            _ => return Ok(false),
        }
        let Some(op) = active.take() else {
            return Ok(false);
        };

        let sent = send_with_retry(&self.actuator, PumpState::Off).await;
        match &sent {
            Ok(()) => tracing::info!(operation = %op.id, reason, "pump off"),
            Err(err) => tracing::error!(
                operation = %op.id,
                error = %err,
                "critical: failed to stop pump, clearing busy flag anyway"
            ),
        }
        append_best_effort(&self.audit, stop_record(&op, reason, &self.clock)).await;
        drop(active);

        sent.map(|()| true)
    }

    /// The operation currently holding the busy flag, if any.
    pub async fn active_operation(&self) -> Option<PumpOperation> {
        self.active.lock().await.clone()
    }

    /// Whether an operation is in flight.
    pub async fn is_busy(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Arm the single-shot shutoff timer for a timed dose.
    ///
    /// The spawned task always runs to completion: it clears the busy
    /// flag whether or not the OFF command (or the audit write) succeeds.
    fn arm_shutoff(&self, op: PumpOperation, duration: Duration) {
        let actuator = self.actuator.clone();
        let audit = self.audit.clone();
        let clock = self.clock.clone();
        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            match send_with_retry(&actuator, PumpState::Off).await {
                Ok(()) => tracing::info!(operation = %op.id, "pump off after timed dose"),
                Err(err) => tracing::error!(
                    operation = %op.id,
                    error = %err,
                    "critical: failed to stop pump after timed dose, clearing busy flag anyway"
                ),
            }
            append_best_effort(&audit, stop_record(&op, "timed dose complete", &clock)).await;
            active.lock().await.take();
        });
    }
}

fn start_record<C: Clock>(
    op: &PumpOperation,
    volume_ml: Option<f64>,
    clock: &C,
) -> Result<AuditRecord, PumphouseError> {
    let mut builder = AuditRecord::builder()
        .strategy(op.strategy)
        .status(PumpState::On)
        .action(op.reason.clone())
        .timestamp(clock.now());
    if let Some(volume) = volume_ml {
        builder = builder.predicted_ml(volume);
    }
    if let Some(duration) = op.planned_duration {
        builder = builder.duration_secs(duration.as_secs_f64());
    }
    builder.build()
}

fn stop_record<C: Clock>(
    op: &PumpOperation,
    reason: &str,
    clock: &C,
) -> Result<AuditRecord, PumphouseError> {
    AuditRecord::builder()
        .strategy(op.strategy)
        .status(PumpState::Off)
        .action(format!("{reason}: {}", op.reason))
        .timestamp(clock.now())
        .build()
}

/// Audit failures must never block actuation; log and move on.
async fn append_best_effort<S: AuditSink + Sync>(
    audit: &S,
    record: Result<AuditRecord, PumphouseError>,
) {
    let result = match record {
        Ok(record) => audit.append(record).await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        tracing::warn!(error = %err, "failed to append audit record");
    }
}

/// Send a pump command with bounded retry and fixed backoff.
async fn send_with_retry<A: ActuatorChannel + Sync>(
    actuator: &A,
    state: PumpState,
) -> Result<(), PumphouseError> {
    let mut attempt = 1;
    loop {
        match actuator.send(state).await {
            Ok(()) => return Ok(()),
            Err(err) if attempt < SEND_ATTEMPTS => {
                tracing::warn!(%state, attempt, error = %err, "actuator send failed, retrying");
                tokio::time::sleep(SEND_RETRY_BACKOFF).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
