//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `pumphouse.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use pumphouse_adapter_adafruit::AdafruitConfig;
use pumphouse_adapter_mqtt::MqttConfig;
use pumphouse_engine::oracle::LinearModelOracle;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Engine timing settings.
    pub engine: EngineConfig,
    /// Prediction model calibration.
    pub oracle: OracleConfig,
    /// Sensor feed selection.
    pub sensors: SensorsConfig,
    /// Actuator channel selection.
    pub actuator: ActuatorConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Engine timing configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between schedule-check ticks.
    pub tick_secs: u64,
}

/// Linear prediction model calibration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub temperature_coef: f64,
    pub humidity_coef: f64,
    pub light_coef: f64,
    pub intercept: f64,
}

impl OracleConfig {
    /// Build the oracle the engine will consult.
    #[must_use]
    pub fn to_oracle(&self) -> LinearModelOracle {
        LinearModelOracle {
            temperature_coef: self.temperature_coef,
            humidity_coef: self.humidity_coef,
            light_coef: self.light_coef,
            intercept: self.intercept,
        }
    }
}

/// Which sensor feed to wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorSource {
    /// Simulated drifting readings.
    Virtual,
    /// Samples published on an MQTT broker.
    Mqtt,
}

/// Sensor feed configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub source: SensorSource,
    /// Seconds between simulated sample rounds (virtual source only).
    pub sample_secs: u64,
    /// Broker settings (mqtt source only).
    pub mqtt: MqttConfig,
}

/// Which actuator channel to wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorKind {
    /// In-memory pump that records commands.
    Virtual,
    /// Adafruit-IO-style HTTP feed.
    Adafruit,
}

/// Actuator configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub kind: ActuatorKind,
    /// Feed settings (adafruit kind only).
    pub adafruit: AdafruitConfig,
}

impl Config {
    /// Load configuration from `pumphouse.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("pumphouse.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PUMPHOUSE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("PUMPHOUSE_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("PUMPHOUSE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("PUMPHOUSE_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("PUMPHOUSE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("PUMPHOUSE_AIO_KEY") {
            self.actuator.adafruit.api_key = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.engine.tick_secs == 0 {
            return Err(ConfigError::Validation(
                "engine.tick_secs must be non-zero".to_string(),
            ));
        }
        if self.actuator.kind == ActuatorKind::Adafruit {
            if self.actuator.adafruit.username.is_empty() {
                return Err(ConfigError::Validation(
                    "actuator.adafruit.username is required".to_string(),
                ));
            }
            if self.actuator.adafruit.api_key.is_empty() {
                return Err(ConfigError::Validation(
                    "actuator.adafruit.api_key is required (or set PUMPHOUSE_AIO_KEY)".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:pumphouse.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pumphoused=info,pumphouse=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { tick_secs: 60 }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        let model = LinearModelOracle::default();
        Self {
            temperature_coef: model.temperature_coef,
            humidity_coef: model.humidity_coef,
            light_coef: model.light_coef,
            intercept: model.intercept,
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            source: SensorSource::Virtual,
            sample_secs: 15,
            mqtt: MqttConfig::default(),
        }
    }
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            kind: ActuatorKind::Virtual,
            adafruit: AdafruitConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
