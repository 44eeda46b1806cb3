//! Sensor channels and the latest-value snapshot the engine decides on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// The three sensor channels feeding the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorChannel {
    Temperature,
    Humidity,
    Light,
}

impl SensorChannel {
    /// All channels, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Humidity, Self::Light];
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Light => "light",
        };
        f.write_str(name)
    }
}

/// A single sensor sample.
///
/// `observed_at` is carried for diagnostics and future staleness checks;
/// the decision layer treats the latest value as current.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    pub observed_at: Timestamp,
}

impl Reading {
    /// Build a reading.
    #[must_use]
    pub fn new(value: f64, observed_at: Timestamp) -> Self {
        Self { value, observed_at }
    }
}

/// The latest reading per channel, pulled once per decision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub temperature: Option<Reading>,
    pub humidity: Option<Reading>,
    pub light: Option<Reading>,
}

impl SensorSnapshot {
    /// The reading for a channel, if any.
    #[must_use]
    pub fn get(&self, channel: SensorChannel) -> Option<Reading> {
        match channel {
            SensorChannel::Temperature => self.temperature,
            SensorChannel::Humidity => self.humidity,
            SensorChannel::Light => self.light,
        }
    }

    /// The value for a channel, if any.
    #[must_use]
    pub fn value(&self, channel: SensorChannel) -> Option<f64> {
        self.get(channel).map(|r| r.value)
    }

    /// Store the reading for a channel.
    pub fn set(&mut self, channel: SensorChannel, reading: Reading) {
        match channel {
            SensorChannel::Temperature => self.temperature = Some(reading),
            SensorChannel::Humidity => self.humidity = Some(reading),
            SensorChannel::Light => self.light = Some(reading),
        }
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, channel: SensorChannel, reading: Reading) -> Self {
        self.set(channel, reading);
        self
    }
}
