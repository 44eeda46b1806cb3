//! # pumphouse-domain
//!
//! Pure domain model for the pumphouse irrigation controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Strategies** (manual, scheduled, environment, predictive)
//! - Define **ControlSettings** (per-strategy configuration, schedule
//!   entries, environment thresholds)
//! - Define **SensorSnapshot** (latest reading per sensor channel)
//! - Define **Decisions** (the output vocabulary of the mode resolver)
//! - Define **PumpOperations** (in-flight actuation records)
//! - Define **AuditRecords** (append-only start/stop log entries)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `engine`, adapters, or external IO
//! crates. All IO boundaries are expressed as traits in the `engine`
//! crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod audit;
pub mod decision;
pub mod pump;
pub mod sensor;
pub mod settings;
pub mod strategy;
