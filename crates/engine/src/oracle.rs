//! Built-in linear-model prediction oracle.
//!
//! The shipped model is a plain linear regression over the three sensor
//! channels, with coefficients taken from pump calibration data. The
//! engine consumes it through the [`PredictionOracle`] port, so it can be
//! swapped for an in-process model or an RPC without touching the
//! decision layer.

use pumphouse_domain::error::PumphouseError;

use crate::ports::PredictionOracle;

/// Linear regression over temperature, humidity, and light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModelOracle {
    pub temperature_coef: f64,
    pub humidity_coef: f64,
    pub light_coef: f64,
    pub intercept: f64,
}

impl Default for LinearModelOracle {
    fn default() -> Self {
        // Calibration fit for the reference greenhouse dataset.
        Self {
            temperature_coef: 3.2,
            humidity_coef: -0.8,
            light_coef: 0.05,
            intercept: -15.0,
        }
    }
}

impl LinearModelOracle {
    /// Evaluate the model, clamping at zero and rounding to whole
    /// millilitres.
    #[must_use]
    pub fn volume_for(&self, temperature: f64, humidity: f64, light: f64) -> f64 {
        let raw = temperature * self.temperature_coef
            + humidity * self.humidity_coef
            + light * self.light_coef
            + self.intercept;
        raw.max(0.0).round()
    }
}

impl PredictionOracle for LinearModelOracle {
    async fn predict(
        &self,
        temperature: f64,
        humidity: f64,
        light: f64,
    ) -> Result<f64, PumphouseError> {
        Ok(self.volume_for(temperature, humidity, light))
    }
}
