//! Actuator channel port — idempotent ON/OFF pump commands.

use std::future::Future;

use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::pump::PumpState;

/// Sends pump commands to the physical (or simulated) pump.
///
/// Commands are idempotent: sending `Off` to a pump that is already off
/// is harmless. Transport failures are transient; the actuation guard
/// retries a bounded number of times.
pub trait ActuatorChannel {
    /// Send a pump command.
    fn send(&self, state: PumpState)
    -> impl Future<Output = Result<(), PumphouseError>> + Send;
}

impl<T: ActuatorChannel + Send + Sync> ActuatorChannel for std::sync::Arc<T> {
    fn send(
        &self,
        state: PumpState,
    ) -> impl Future<Output = Result<(), PumphouseError>> + Send {
        (**self).send(state)
    }
}
