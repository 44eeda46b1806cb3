//! Mode resolver — which strategy governs the pump, and what it wants.
//!
//! Precedence is manual > scheduled > environment > predictive. A
//! strategy that is enabled but whose firing condition is not met yields
//! to the next one, with one exception: an environment condition that is
//! currently true but not yet gate-approved (still holding, or cooling
//! down) keeps the predictive strategy out, so a pending environment
//! dose is never preempted by an oracle dose.
//!
//! Every error on the way to a decision degrades to [`Decision::Idle`]:
//! the pump never fires on uncertain input. The error is carried in the
//! [`Resolution`] for the caller to log.

use std::time::Duration;

use pumphouse_domain::decision::Decision;
use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::sensor::{SensorChannel, SensorSnapshot};
use pumphouse_domain::settings::ControlSettings;
use pumphouse_domain::strategy::Strategy;
use pumphouse_domain::time::{TimeOfDay, Timestamp, Weekday};

use crate::hold::HoldController;
use crate::ports::PredictionOracle;

/// Pump calibration: millilitres delivered per second of runtime.
pub const PUMP_RATE_ML_PER_SEC: f64 = 3.0;

/// Fixed length of an environment-triggered dose.
pub const ENVIRONMENT_DOSE: Duration = Duration::from_secs(120);

/// Neutral light level substituted when the light channel has no value.
pub const NEUTRAL_LIGHT_LUX: f64 = 50.0;

/// Outcome of one decision pass.
#[derive(Debug)]
pub struct Resolution {
    pub decision: Decision,
    /// Error that degraded the pass to idle, if any.
    pub fault: Option<PumphouseError>,
}

impl Resolution {
    fn decided(decision: Decision) -> Self {
        Self {
            decision,
            fault: None,
        }
    }

    fn idle() -> Self {
        Self::decided(Decision::Idle)
    }

    fn faulted(fault: PumphouseError) -> Self {
        Self {
            decision: Decision::Idle,
            fault: Some(fault),
        }
    }
}

/// Resolves the governing strategy from settings and the latest sensor
/// snapshot.
pub struct ModeResolver<O> {
    oracle: O,
}

impl<O: PredictionOracle> ModeResolver<O> {
    /// Create a resolver around the given prediction oracle.
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Run one decision pass.
    ///
    /// `gate` is the hold controller for the environment strategy; it is
    /// fed on every pass where the environment strategy is consulted and
    /// reset on every pass where it is not, so a condition that stops
    /// being observed must re-qualify from scratch.
    pub async fn resolve(
        &self,
        settings: Option<&ControlSettings>,
        snapshot: &SensorSnapshot,
        now: Timestamp,
        gate: &mut HoldController,
    ) -> Resolution {
        let Some(settings) = settings else {
            gate.reset();
            return Resolution::faulted(PumphouseError::ConfigMissing);
        };

        // 1. Manual — the toggle is the pump state.
        if settings.manual.enabled {
            gate.reset();
            return Resolution::decided(Decision::FireIndefinite {
                strategy: Strategy::Manual,
            });
        }

        // 2. Scheduled — indefinite fire while a window covers `now`.
        if settings.scheduled.enabled {
            let day = Weekday::from_timestamp(&now);
            let time = TimeOfDay::from_timestamp(&now);
            if settings.scheduled.entry_covering(day, time).is_some() {
                gate.reset();
                return Resolution::decided(Decision::FireIndefinite {
                    strategy: Strategy::Scheduled,
                });
            }
        }

        // 3. Environment — gate-approved fixed dose.
        if settings.environment.enabled {
            let condition = settings.environment.thresholds.met_by(snapshot);
            if gate.observe(condition, now) {
                return Resolution::decided(Decision::FireForDuration {
                    strategy: Strategy::Environment,
                    duration: ENVIRONMENT_DOSE,
                    volume_ml: None,
                });
            }
            if condition {
                // Holding or in cooldown — the environment strategy
                // governs, so nothing below may fire.
                return Resolution::idle();
            }
        } else {
            gate.reset();
        }

        // 4. Predictive — oracle-computed dose.
        if settings.predictive.enabled {
            return self.resolve_predictive(snapshot).await;
        }

        Resolution::idle()
    }

    async fn resolve_predictive(&self, snapshot: &SensorSnapshot) -> Resolution {
        let Some(temperature) = snapshot.value(SensorChannel::Temperature) else {
            return Resolution::faulted(PumphouseError::SensorUnavailable(
                SensorChannel::Temperature,
            ));
        };
        let Some(humidity) = snapshot.value(SensorChannel::Humidity) else {
            return Resolution::faulted(PumphouseError::SensorUnavailable(
                SensorChannel::Humidity,
            ));
        };
        let light = snapshot
            .value(SensorChannel::Light)
            .unwrap_or(NEUTRAL_LIGHT_LUX);

        let volume = match self.oracle.predict(temperature, humidity, light).await {
            Ok(volume) => volume,
            Err(err) => return Resolution::faulted(err),
        };

        if !volume.is_finite() {
            tracing::warn!(volume, "oracle returned a non-finite volume, staying idle");
            return Resolution::idle();
        }
        if volume <= 0.0 {
            tracing::info!("no water needed");
            return Resolution::idle();
        }

        let duration = Duration::from_secs_f64(volume / PUMP_RATE_ML_PER_SEC);
        Resolution::decided(Decision::FireForDuration {
            strategy: Strategy::Predictive,
            duration,
            volume_ml: Some(volume),
        })
    }
}
