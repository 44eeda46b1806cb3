//! # pumphouse-adapter-mqtt
//!
//! MQTT adapter — bridges broker-published sensor samples into the
//! pumphouse engine.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker and subscribe to one topic per sensor
//!   channel (`<base_topic>/temperature`, `…/humidity`, `…/light`)
//! - Parse payloads (bare floats, or JSON objects with a `value` field)
//! - Cache the latest reading per channel behind the `SensorFeed` port
//! - Wake the engine with a sensor-sample trigger for every sample
//!
//! ## Dependency rule
//! Same as other adapters: depends on `pumphouse-engine` and
//! `pumphouse-domain`.

mod config;
mod error;

pub use config::MqttConfig;
pub use error::MqttError;

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::sensor::{Reading, SensorChannel, SensorSnapshot};
use pumphouse_engine::ports::{Clock, SensorFeed, SystemClock};
use pumphouse_engine::trigger::TriggerHandle;

/// Latest-value cache fed by the MQTT event loop.
#[derive(Clone, Default)]
pub struct MqttSensorFeed {
    snapshot: Arc<RwLock<SensorSnapshot>>,
}

impl SensorFeed for MqttSensorFeed {
    async fn latest(&self, channel: SensorChannel) -> Result<Option<Reading>, PumphouseError> {
        Ok(self.snapshot.read().await.get(channel))
    }
}

/// Owns the MQTT connection and pushes samples into a [`MqttSensorFeed`].
pub struct MqttIntegration {
    config: MqttConfig,
    feed: MqttSensorFeed,
    triggers: TriggerHandle,
}

impl MqttIntegration {
    /// Create an integration that wakes the engine through `triggers`.
    #[must_use]
    pub fn new(config: MqttConfig, triggers: TriggerHandle) -> Self {
        Self {
            config,
            feed: MqttSensorFeed::default(),
            triggers,
        }
    }

    /// The feed this integration keeps up to date.
    #[must_use]
    pub fn feed(&self) -> MqttSensorFeed {
        self.feed.clone()
    }

    /// Connect, subscribe, and spawn the event-loop task.
    ///
    /// rumqttc reconnects by simply continuing to poll; connection errors
    /// are logged and polling resumes after a short pause.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Client`] when the initial subscriptions cannot
    /// be queued.
    pub async fn spawn(self) -> Result<JoinHandle<()>, MqttError> {
        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.broker_host.clone(),
            self.config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(self.config.keep_alive_secs)));

        let (client, mut event_loop) = AsyncClient::new(options, 16);
        for channel in SensorChannel::ALL {
            client
                .subscribe(topic_for(&self.config.base_topic, channel), QoS::AtLeastOnce)
                .await
                .map_err(MqttError::Client)?;
        }

        let base_topic = self.config.base_topic.clone();
        let feed = self.feed;
        let triggers = self.triggers;
        let clock = SystemClock;
        Ok(tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let Some(channel) = channel_for_topic(&base_topic, &publish.topic) else {
                            tracing::debug!(topic = %publish.topic, "ignoring unrelated topic");
                            continue;
                        };
                        let Some(value) = parse_value(&publish.payload) else {
                            tracing::warn!(
                                topic = %publish.topic,
                                "unparseable MQTT payload, sample dropped"
                            );
                            continue;
                        };
                        {
                            let mut snapshot = feed.snapshot.write().await;
                            snapshot.set(channel, Reading::new(value, clock.now()));
                        }
                        tracing::debug!(%channel, value, "sensor sample received");
                        triggers.sensor_sample(channel).await;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "MQTT connection error, retrying");
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }))
    }
}

/// Topic carrying samples for a channel.
#[must_use]
pub fn topic_for(base_topic: &str, channel: SensorChannel) -> String {
    format!("{base_topic}/{channel}")
}

/// Channel a topic belongs to, if it is one of ours.
fn channel_for_topic(base_topic: &str, topic: &str) -> Option<SensorChannel> {
    let suffix = topic.strip_prefix(base_topic)?.strip_prefix('/')?;
    SensorChannel::ALL
        .into_iter()
        .find(|channel| channel.to_string() == suffix)
}

/// Parse a payload as a bare float, or a JSON object with a numeric
/// `value` field (the shape some sensor bridges publish).
fn parse_value(payload: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(payload).ok()?;
    if let Ok(value) = text.trim().parse::<f64>() {
        return Some(value);
    }
    let json: serde_json::Value = serde_json::from_str(text).ok()?;
    json.get("value").and_then(serde_json::Value::as_f64)
}
