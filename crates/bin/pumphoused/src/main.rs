//! # pumphoused — pumphouse daemon
//!
//! Composition root that wires all adapters together and starts the
//! irrigation controller.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize the `SQLite` pool and run migrations
//! - Construct the sensor feed and actuator selected by configuration
//! - Spawn the control loop and its periodic tick
//! - Build the axum router and serve it with graceful shutdown
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pumphouse_adapter_adafruit::AdafruitActuator;
use pumphouse_adapter_http_axum::state::AppState;
use pumphouse_adapter_mqtt::{MqttIntegration, MqttSensorFeed};
use pumphouse_adapter_storage_sqlite_sqlx::{Config as DbConfig, SqliteAuditLog, SqliteSettingsStore};
use pumphouse_adapter_virtual::{VirtualPump, VirtualSensorFeed, spawn_simulator};
use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::pump::PumpState;
use pumphouse_domain::sensor::{Reading, SensorChannel};
use pumphouse_engine::control_loop::ControlLoop;
use pumphouse_engine::event_bus::{FanoutSink, PumpEventBus};
use pumphouse_engine::ports::{ActuatorChannel, SensorFeed, SystemClock};
use pumphouse_engine::trigger::{TRIGGER_QUEUE_CAPACITY, spawn_tick, trigger_queue};

use crate::config::{ActuatorKind, Config, SensorSource};

/// Runtime-selected actuator channel.
#[derive(Clone)]
enum PumpChannel {
    Virtual(VirtualPump),
    Adafruit(AdafruitActuator),
}

impl ActuatorChannel for PumpChannel {
    async fn send(&self, state: PumpState) -> Result<(), PumphouseError> {
        match self {
            Self::Virtual(pump) => pump.send(state).await,
            Self::Adafruit(feed) => feed.send(state).await,
        }
    }
}

/// Runtime-selected sensor feed.
#[derive(Clone)]
enum Feed {
    Virtual(VirtualSensorFeed),
    Mqtt(MqttSensorFeed),
}

impl SensorFeed for Feed {
    async fn latest(&self, channel: SensorChannel) -> Result<Option<Reading>, PumphouseError> {
        match self {
            Self::Virtual(feed) => feed.latest(channel).await,
            Self::Mqtt(feed) => feed.latest(channel).await,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).context("invalid log filter")?,
        )
        .init();

    // Storage
    let db = DbConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await
    .context("initializing database")?;
    let pool = db.pool().clone();
    let settings_store = Arc::new(SqliteSettingsStore::new(pool.clone()));
    let audit_log = Arc::new(SqliteAuditLog::new(pool));

    // Event bus + trigger queue
    let event_bus = Arc::new(PumpEventBus::new(256));
    let audit_sink = FanoutSink(Arc::clone(&audit_log), Arc::clone(&event_bus));
    let (triggers, trigger_rx) = trigger_queue(TRIGGER_QUEUE_CAPACITY);

    // Sensors
    let feed = match config.sensors.source {
        SensorSource::Virtual => {
            let feed = VirtualSensorFeed::new();
            spawn_simulator(
                feed.clone(),
                triggers.clone(),
                SystemClock,
                Duration::from_secs(config.sensors.sample_secs),
            );
            tracing::info!("virtual sensor feed started");
            Feed::Virtual(feed)
        }
        SensorSource::Mqtt => {
            let integration = MqttIntegration::new(config.sensors.mqtt.clone(), triggers.clone());
            let feed = integration.feed();
            integration
                .spawn()
                .await
                .context("starting MQTT integration")?;
            tracing::info!(
                broker = %config.sensors.mqtt.broker_host,
                "MQTT sensor feed started"
            );
            Feed::Mqtt(feed)
        }
    };

    // Actuator
    let actuator = match config.actuator.kind {
        ActuatorKind::Virtual => PumpChannel::Virtual(VirtualPump::new()),
        ActuatorKind::Adafruit => PumpChannel::Adafruit(
            AdafruitActuator::new(config.actuator.adafruit.clone())
                .context("building Adafruit actuator")?,
        ),
    };

    // Engine
    let control = ControlLoop::new(
        Arc::clone(&settings_store),
        feed.clone(),
        config.oracle.to_oracle(),
        actuator,
        audit_sink.clone(),
        SystemClock,
        trigger_rx,
    );
    tokio::spawn(control.run());
    spawn_tick(triggers.clone(), Duration::from_secs(config.engine.tick_secs));

    // HTTP
    let state = AppState::new(
        Arc::clone(&settings_store),
        feed,
        Arc::clone(&audit_log),
        audit_sink,
        Arc::clone(&event_bus),
        triggers,
    );
    let app = pumphouse_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "pumphoused listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("binding listener")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
