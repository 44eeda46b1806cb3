//! # pumphouse-engine
//!
//! Application core — the irrigation decision & actuation engine, plus
//! the **port definitions** (traits) adapters must implement.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement (driven/outbound ports):
//!   - `SettingsStore` — the singleton control-settings document
//!   - `SensorFeed` — latest value per sensor channel
//!   - `PredictionOracle` — sensor readings → recommended volume
//!   - `ActuatorChannel` — idempotent ON/OFF pump commands
//!   - `AuditSink` / `AuditQuery` — append-only start/stop log
//!   - `Clock` — current time, swappable for deterministic tests
//! - Resolve the governing strategy per decision pass (`ModeResolver`)
//! - Debounce environment conditions and space out doses (`HoldController`)
//! - Serialize pump operations and guarantee shutoff (`ActuationGuard`)
//! - Funnel timer ticks, sensor samples, and settings changes into one
//!   queue the control loop drains (`trigger`)
//! - Provide **in-process infrastructure** (pump event bus) that doesn't
//!   need IO
//!
//! ## Dependency rule
//! Depends on `pumphouse-domain` only (plus `tokio::sync`/`tokio::time`
//! for channels and timers). Never imports adapter crates. Adapters
//! depend on *this* crate, not the reverse.

pub mod control_loop;
pub mod event_bus;
pub mod guard;
pub mod hold;
pub mod oracle;
pub mod ports;
pub mod resolver;
pub mod trigger;
