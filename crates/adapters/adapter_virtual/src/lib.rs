//! # pumphouse-adapter-virtual
//!
//! Virtual/demo adapter that provides a simulated sensor feed and pump
//! for testing and demonstration purposes.
//!
//! ## Provided pieces
//!
//! | Piece | Port | Behaviour |
//! |-------|------|-----------|
//! | [`VirtualSensorFeed`] | `SensorFeed` | Holds the latest reading per channel |
//! | [`VirtualPump`] | `ActuatorChannel` | Records every command; can inject failures |
//! | [`spawn_simulator`] | — | Generates slowly drifting readings |
//!
//! ## Dependency rule
//!
//! Depends on `pumphouse-engine` (port traits) and `pumphouse-domain` only.

mod feed;
mod pump;

pub use feed::{VirtualSensorFeed, spawn_simulator};
pub use pump::VirtualPump;
