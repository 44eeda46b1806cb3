//! Settings store port — the singleton control-settings document.

use std::future::Future;

use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::settings::{ControlSettings, ScheduleEntry, Thresholds};
use pumphouse_domain::strategy::Strategy;

/// Read/write access to the control-settings document.
///
/// The engine only reads; the mutation methods exist for user-facing
/// flows (the HTTP surface) and always return the updated document.
pub trait SettingsStore {
    /// Fetch the settings document, or `None` if none has been written yet.
    fn get(&self)
    -> impl Future<Output = Result<Option<ControlSettings>, PumphouseError>> + Send;

    /// Flip the enabled flag of one mode.
    fn set_mode_enabled(
        &self,
        strategy: Strategy,
        enabled: bool,
    ) -> impl Future<Output = Result<ControlSettings, PumphouseError>> + Send;

    /// Replace the schedule entries.
    fn set_schedule(
        &self,
        entries: Vec<ScheduleEntry>,
    ) -> impl Future<Output = Result<ControlSettings, PumphouseError>> + Send;

    /// Replace the environment thresholds.
    fn set_thresholds(
        &self,
        thresholds: Thresholds,
    ) -> impl Future<Output = Result<ControlSettings, PumphouseError>> + Send;
}

impl<T: SettingsStore + Send + Sync> SettingsStore for std::sync::Arc<T> {
    fn get(
        &self,
    ) -> impl Future<Output = Result<Option<ControlSettings>, PumphouseError>> + Send {
        (**self).get()
    }

    fn set_mode_enabled(
        &self,
        strategy: Strategy,
        enabled: bool,
    ) -> impl Future<Output = Result<ControlSettings, PumphouseError>> + Send {
        (**self).set_mode_enabled(strategy, enabled)
    }

    fn set_schedule(
        &self,
        entries: Vec<ScheduleEntry>,
    ) -> impl Future<Output = Result<ControlSettings, PumphouseError>> + Send {
        (**self).set_schedule(entries)
    }

    fn set_thresholds(
        &self,
        thresholds: Thresholds,
    ) -> impl Future<Output = Result<ControlSettings, PumphouseError>> + Send {
        (**self).set_thresholds(thresholds)
    }
}
