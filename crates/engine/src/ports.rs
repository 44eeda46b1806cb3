//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the engine core and the outside
//! world. They are defined here (in `engine`) so that both the decision
//! layer and the adapter layer can depend on them without creating
//! circular dependencies.

pub mod actuator;
pub mod audit;
pub mod clock;
pub mod oracle;
pub mod sensor_feed;
pub mod settings_store;

pub use actuator::ActuatorChannel;
pub use audit::{AuditQuery, AuditSink};
pub use clock::{Clock, SystemClock};
pub use oracle::PredictionOracle;
pub use sensor_feed::SensorFeed;
pub use settings_store::SettingsStore;
