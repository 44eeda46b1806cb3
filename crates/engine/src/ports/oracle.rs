//! Prediction oracle port — sensor readings → recommended volume.

use std::future::Future;

use pumphouse_domain::error::PumphouseError;

/// Maps the latest sensor readings to a recommended water volume in
/// millilitres.
///
/// The oracle is opaque to the engine: it may be a local model, an
/// in-process computation, or an out-of-process call. A non-positive
/// result means "no dose".
pub trait PredictionOracle {
    /// Predict the recommended volume for the given readings.
    fn predict(
        &self,
        temperature: f64,
        humidity: f64,
        light: f64,
    ) -> impl Future<Output = Result<f64, PumphouseError>> + Send;
}

impl<T: PredictionOracle + Send + Sync> PredictionOracle for std::sync::Arc<T> {
    fn predict(
        &self,
        temperature: f64,
        humidity: f64,
        light: f64,
    ) -> impl Future<Output = Result<f64, PumphouseError>> + Send {
        (**self).predict(temperature, humidity, light)
    }
}
