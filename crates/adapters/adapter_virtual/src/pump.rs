//! Simulated pump.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::Mutex;

use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::pump::PumpState;
use pumphouse_engine::ports::ActuatorChannel;

#[derive(Debug, thiserror::Error)]
#[error("injected virtual pump failure")]
struct InjectedFailure;

/// A pump that records every command it accepts.
///
/// Tests can inject a number of upcoming failures to exercise the
/// guard's retry and shutoff paths.
#[derive(Clone, Default)]
pub struct VirtualPump {
    history: Arc<Mutex<Vec<PumpState>>>,
    fail_next: Arc<AtomicU32>,
}

impl VirtualPump {
    /// Create a pump that accepts every command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` sends fail.
    pub fn fail_next(&self, times: u32) {
        self.fail_next.store(times, Ordering::SeqCst);
    }

    /// Every command accepted so far, oldest first.
    pub async fn history(&self) -> Vec<PumpState> {
        self.history.lock().await.clone()
    }

    /// The last accepted command, if any.
    pub async fn last_state(&self) -> Option<PumpState> {
        self.history.lock().await.last().copied()
    }
}

impl ActuatorChannel for VirtualPump {
    async fn send(&self, state: PumpState) -> Result<(), PumphouseError> {
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(PumphouseError::actuator_send(InjectedFailure));
        }
        self.history.lock().await.push(state);
        tracing::debug!(%state, "virtual pump command accepted");
        Ok(())
    }
}
