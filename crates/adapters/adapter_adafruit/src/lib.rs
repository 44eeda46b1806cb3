//! # pumphouse-adapter-adafruit
//!
//! Actuator adapter that drives the pump relay through an
//! Adafruit-IO-style HTTP feed: `ON`/`OFF` become `"1"`/`"0"` data points
//! posted to the feed, authenticated with an `X-AIO-Key` header.
//!
//! The request carries a bounded timeout; retrying is the actuation
//! guard's job, so a failed POST surfaces as
//! [`PumphouseError::ActuatorSend`] and nothing else.

use serde::Deserialize;

use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::pump::PumpState;
use pumphouse_engine::ports::ActuatorChannel;

/// Configuration for the Adafruit-IO feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdafruitConfig {
    /// API base, without a trailing slash.
    pub base_url: String,
    /// Account the feed belongs to.
    pub username: String,
    /// Feed key the pump relay listens on.
    pub feed: String,
    /// `X-AIO-Key` credential.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AdafruitConfig {
    fn default() -> Self {
        Self {
            base_url: "https://io.adafruit.com/api/v2".to_string(),
            username: String::new(),
            feed: "pump-btn".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl AdafruitConfig {
    /// Endpoint that accepts feed data points.
    #[must_use]
    pub fn feed_url(&self) -> String {
        format!(
            "{}/{}/feeds/{}/data",
            self.base_url, self.username, self.feed
        )
    }
}

/// Errors specific to the Adafruit adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdafruitError {
    /// The HTTP request failed outright (connect, timeout, …).
    #[error("feed request failed")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("feed rejected data point with status {0}")]
    Status(reqwest::StatusCode),
}

impl From<AdafruitError> for PumphouseError {
    fn from(err: AdafruitError) -> Self {
        Self::ActuatorSend(Box::new(err))
    }
}

/// Pump actuator posting to an Adafruit-IO feed.
#[derive(Clone)]
pub struct AdafruitActuator {
    client: reqwest::Client,
    config: AdafruitConfig,
}

impl AdafruitActuator {
    /// Build the actuator, including its bounded-timeout HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`AdafruitError::Http`] when the client cannot be built.
    pub fn new(config: AdafruitConfig) -> Result<Self, AdafruitError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

impl ActuatorChannel for AdafruitActuator {
    async fn send(&self, state: PumpState) -> Result<(), PumphouseError> {
        let response = self
            .client
            .post(self.config.feed_url())
            .header("X-AIO-Key", &self.config.api_key)
            .json(&serde_json::json!({ "value": feed_value(state) }))
            .send()
            .await
            .map_err(AdafruitError::Http)?;

        if !response.status().is_success() {
            return Err(AdafruitError::Status(response.status()).into());
        }
        tracing::debug!(%state, "pump state sent to feed");
        Ok(())
    }
}

/// The data-point value the relay firmware expects.
fn feed_value(state: PumpState) -> &'static str {
    match state {
        PumpState::On => "1",
        PumpState::Off => "0",
    }
}
