//! Control settings — the singleton configuration document.
//!
//! One [`ControlSettings`] record holds a config block per strategy. The
//! `enabled` flags are independent (the UI may switch several on at
//! once); precedence is applied at resolution time, not here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::ScheduleEntryId;
use crate::sensor::{SensorChannel, SensorSnapshot};
use crate::strategy::Strategy;
use crate::time::{TimeOfDay, Weekday};

/// The singleton settings document read by every decision pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub manual: ManualMode,
    pub scheduled: ScheduledMode,
    pub environment: EnvironmentMode,
    pub predictive: PredictiveMode,
}

impl ControlSettings {
    /// Whether the given strategy is enabled.
    #[must_use]
    pub fn mode_enabled(&self, strategy: Strategy) -> bool {
        match strategy {
            Strategy::Manual => self.manual.enabled,
            Strategy::Scheduled => self.scheduled.enabled,
            Strategy::Environment => self.environment.enabled,
            Strategy::Predictive => self.predictive.enabled,
        }
    }

    /// Flip the enabled flag for the given strategy.
    pub fn set_mode_enabled(&mut self, strategy: Strategy, enabled: bool) {
        match strategy {
            Strategy::Manual => self.manual.enabled = enabled,
            Strategy::Scheduled => self.scheduled.enabled = enabled,
            Strategy::Environment => self.environment.enabled = enabled,
            Strategy::Predictive => self.predictive.enabled = enabled,
        }
    }
}

/// Manual override — the toggle itself is the pump state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualMode {
    pub enabled: bool,
}

/// Weekly schedule windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduledMode {
    pub enabled: bool,
    pub entries: Vec<ScheduleEntry>,
}

impl ScheduledMode {
    /// The first active entry covering the given weekday and time, if any.
    #[must_use]
    pub fn entry_covering(&self, day: Weekday, time: TimeOfDay) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|entry| entry.covers(day, time))
    }
}

/// One weekly watering window.
///
/// The window is inclusive on both ends; a reversed window
/// (`start > end`) never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(default)]
    pub id: ScheduleEntryId,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub days: BTreeSet<Weekday>,
    pub active: bool,
}

impl ScheduleEntry {
    /// Whether this entry is active and covers the given weekday and time.
    #[must_use]
    pub fn covers(&self, day: Weekday, time: TimeOfDay) -> bool {
        self.active && self.days.contains(&day) && self.start <= time && time <= self.end
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDays`] when no weekday is selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.days.is_empty() {
            return Err(ValidationError::EmptyDays);
        }
        Ok(())
    }
}

/// Threshold automation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentMode {
    pub enabled: bool,
    pub thresholds: Thresholds,
}

/// Environmental trigger thresholds. Each field is optional; presence
/// means "is a condition".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Fire when temperature rises above this.
    pub temperature_max: Option<f64>,
    /// Fire when humidity drops below this.
    pub humidity_min: Option<f64>,
    /// Fire when light rises above this.
    pub brightness_max: Option<f64>,
}

impl Thresholds {
    /// Whether at least one sub-condition is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.temperature_max.is_some()
            || self.humidity_min.is_some()
            || self.brightness_max.is_some()
    }

    /// Whether any configured sub-condition holds for the snapshot.
    ///
    /// A sub-condition whose sensor channel has no value is denied
    /// (fail-closed): a missing reading never fires the pump.
    #[must_use]
    pub fn met_by(&self, snapshot: &SensorSnapshot) -> bool {
        let is_hot = self
            .temperature_max
            .zip(snapshot.value(SensorChannel::Temperature))
            .is_some_and(|(max, value)| value > max);
        let is_dry = self
            .humidity_min
            .zip(snapshot.value(SensorChannel::Humidity))
            .is_some_and(|(min, value)| value < min);
        let is_bright = self
            .brightness_max
            .zip(snapshot.value(SensorChannel::Light))
            .is_some_and(|(max, value)| value > max);
        is_hot || is_dry || is_bright
    }
}

/// Oracle-driven dosing configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictiveMode {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::Reading;
    use crate::time::now;

    fn entry(start: &str, end: &str, days: &[Weekday], active: bool) -> ScheduleEntry {
        ScheduleEntry {
            id: ScheduleEntryId::new(),
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            days: days.iter().copied().collect(),
            active,
        }
    }

    #[test]
    fn should_default_to_all_modes_disabled() {
        let settings = ControlSettings::default();
        for strategy in Strategy::PRECEDENCE {
            assert!(!settings.mode_enabled(strategy));
        }
    }

    #[test]
    fn should_flip_mode_flags_independently() {
        let mut settings = ControlSettings::default();
        settings.set_mode_enabled(Strategy::Environment, true);
        settings.set_mode_enabled(Strategy::Manual, true);

        assert!(settings.mode_enabled(Strategy::Manual));
        assert!(settings.mode_enabled(Strategy::Environment));
        assert!(!settings.mode_enabled(Strategy::Scheduled));
        assert!(!settings.mode_enabled(Strategy::Predictive));
    }

    #[test]
    fn should_cover_time_inside_window_on_selected_day() {
        let entry = entry("08:00", "08:30", &[Weekday::Mon, Weekday::Fri], true);
        assert!(entry.covers(Weekday::Mon, "08:15".parse().unwrap()));
        assert!(entry.covers(Weekday::Fri, "08:00".parse().unwrap()));
        assert!(entry.covers(Weekday::Fri, "08:30".parse().unwrap()));
    }

    #[test]
    fn should_not_cover_outside_window_or_day() {
        let entry = entry("08:00", "08:30", &[Weekday::Mon], true);
        assert!(!entry.covers(Weekday::Mon, "07:59".parse().unwrap()));
        assert!(!entry.covers(Weekday::Mon, "08:31".parse().unwrap()));
        assert!(!entry.covers(Weekday::Tue, "08:15".parse().unwrap()));
    }

    #[test]
    fn should_not_cover_when_inactive() {
        let entry = entry("08:00", "08:30", &[Weekday::Mon], false);
        assert!(!entry.covers(Weekday::Mon, "08:15".parse().unwrap()));
    }

    #[test]
    fn should_never_match_reversed_window() {
        let entry = entry("22:00", "06:00", &[Weekday::Mon], true);
        assert!(!entry.covers(Weekday::Mon, "23:00".parse().unwrap()));
        assert!(!entry.covers(Weekday::Mon, "05:00".parse().unwrap()));
    }

    #[test]
    fn should_find_first_covering_entry() {
        let mode = ScheduledMode {
            enabled: true,
            entries: vec![
                entry("06:00", "06:10", &[Weekday::Sat], true),
                entry("18:00", "18:10", &[Weekday::Sat], true),
            ],
        };
        let found = mode.entry_covering(Weekday::Sat, "18:05".parse().unwrap());
        assert!(found.is_some());
        assert_eq!(found.unwrap().start.to_string(), "18:00");
        assert!(
            mode.entry_covering(Weekday::Sat, "12:00".parse().unwrap())
                .is_none()
        );
    }

    #[test]
    fn should_reject_entry_with_no_days() {
        let entry = entry("08:00", "08:30", &[], true);
        assert_eq!(entry.validate(), Err(ValidationError::EmptyDays));
    }

    #[test]
    fn should_report_unconfigured_thresholds() {
        assert!(!Thresholds::default().is_configured());
        let thresholds = Thresholds {
            humidity_min: Some(40.0),
            ..Thresholds::default()
        };
        assert!(thresholds.is_configured());
    }

    #[test]
    fn should_meet_threshold_when_any_sub_condition_holds() {
        let ts = now();
        let thresholds = Thresholds {
            temperature_max: Some(30.0),
            humidity_min: Some(40.0),
            brightness_max: None,
        };
        let hot = SensorSnapshot::default()
            .with(SensorChannel::Temperature, Reading::new(31.0, ts))
            .with(SensorChannel::Humidity, Reading::new(55.0, ts));
        assert!(thresholds.met_by(&hot));

        let dry = SensorSnapshot::default()
            .with(SensorChannel::Temperature, Reading::new(25.0, ts))
            .with(SensorChannel::Humidity, Reading::new(35.0, ts));
        assert!(thresholds.met_by(&dry));

        let mild = SensorSnapshot::default()
            .with(SensorChannel::Temperature, Reading::new(25.0, ts))
            .with(SensorChannel::Humidity, Reading::new(55.0, ts));
        assert!(!thresholds.met_by(&mild));
    }

    #[test]
    fn should_use_strict_comparisons_at_threshold_boundaries() {
        let ts = now();
        let thresholds = Thresholds {
            temperature_max: Some(30.0),
            humidity_min: Some(40.0),
            brightness_max: Some(600.0),
        };
        let boundary = SensorSnapshot::default()
            .with(SensorChannel::Temperature, Reading::new(30.0, ts))
            .with(SensorChannel::Humidity, Reading::new(40.0, ts))
            .with(SensorChannel::Light, Reading::new(600.0, ts));
        assert!(!thresholds.met_by(&boundary));
    }

    #[test]
    fn should_deny_condition_when_sensor_value_missing() {
        let thresholds = Thresholds {
            temperature_max: Some(30.0),
            ..Thresholds::default()
        };
        assert!(!thresholds.met_by(&SensorSnapshot::default()));
    }

    #[test]
    fn should_roundtrip_settings_through_serde_json() {
        let mut settings = ControlSettings::default();
        settings.set_mode_enabled(Strategy::Scheduled, true);
        settings.scheduled.entries = vec![entry("07:00", "07:10", &[Weekday::Wed], true)];
        settings.environment.thresholds.temperature_max = Some(29.5);

        let json = serde_json::to_string(&settings).unwrap();
        let parsed: ControlSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn should_fill_missing_sections_with_defaults_when_deserializing() {
        let parsed: ControlSettings =
            serde_json::from_str(r#"{"manual": {"enabled": true}}"#).unwrap();
        assert!(parsed.manual.enabled);
        assert!(!parsed.predictive.enabled);
        assert!(parsed.scheduled.entries.is_empty());
    }
}
