//! Control loop — drains the trigger queue and drives the pump.
//!
//! Every trigger runs the same pipeline: pull fresh settings and sensor
//! snapshots, resolve the governing strategy, and reconcile the pump
//! through the actuation guard. A bad cycle logs and moves on; the loop
//! itself only exits when every trigger handle has been dropped.

use tokio::sync::mpsc;

use pumphouse_domain::decision::Decision;
use pumphouse_domain::sensor::SensorSnapshot;
use pumphouse_domain::strategy::Strategy;

use crate::guard::{ActuationGuard, FireOutcome};
use crate::hold::HoldController;
use crate::ports::{ActuatorChannel, AuditSink, Clock, PredictionOracle, SensorFeed, SettingsStore};
use crate::resolver::ModeResolver;
use crate::trigger::Trigger;

/// The long-running decision/actuation pipeline.
pub struct ControlLoop<SS, SF, O, A, S, C> {
    settings: SS,
    sensors: SF,
    resolver: ModeResolver<O>,
    gate: HoldController,
    guard: ActuationGuard<A, S, C>,
    clock: C,
    triggers: mpsc::Receiver<Trigger>,
}

impl<SS, SF, O, A, S, C> ControlLoop<SS, SF, O, A, S, C>
where
    SS: SettingsStore + Send + Sync,
    SF: SensorFeed + Send + Sync,
    O: PredictionOracle + Send + Sync,
    A: ActuatorChannel + Clone + Send + Sync + 'static,
    S: AuditSink + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    /// Wire up a control loop from its collaborators.
    pub fn new(
        settings: SS,
        sensors: SF,
        oracle: O,
        actuator: A,
        audit: S,
        clock: C,
        triggers: mpsc::Receiver<Trigger>,
    ) -> Self {
        Self {
            settings,
            sensors,
            resolver: ModeResolver::new(oracle),
            gate: HoldController::default(),
            guard: ActuationGuard::new(actuator, audit, clock.clone()),
            clock,
            triggers,
        }
    }

    /// Drain triggers until every [`TriggerHandle`](crate::trigger::TriggerHandle)
    /// is dropped.
    pub async fn run(mut self) {
        tracing::info!("control loop started");
        while let Some(trigger) = self.triggers.recv().await {
            self.step(trigger).await;
        }
        tracing::info!("trigger queue closed, control loop exiting");
    }

    /// Run one decision pass for a single trigger.
    pub async fn step(&mut self, trigger: Trigger) {
        let settings = match self.settings.get().await {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(?trigger, error = %err, "failed to load settings");
                None
            }
        };
        let snapshot = match self.sensors.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(?trigger, error = %err, "failed to read sensors");
                SensorSnapshot::default()
            }
        };

        let now = self.clock.now();
        let resolution = self
            .resolver
            .resolve(settings.as_ref(), &snapshot, now, &mut self.gate)
            .await;
        if let Some(fault) = &resolution.fault {
            tracing::warn!(?trigger, error = %fault, "decision pass degraded to idle");
        }

        match resolution.decision {
            Decision::Idle => {
                match self.guard.stop_indefinite("governing condition ended").await {
                    Ok(true) => tracing::debug!(?trigger, "pump stopped"),
                    Ok(false) => {}
                    Err(err) => {
                        tracing::error!(?trigger, error = %err, "failed to stop pump cleanly");
                    }
                }
            }
            Decision::FireIndefinite { strategy } => {
                self.fire(trigger, strategy, None, None).await;
            }
            Decision::FireForDuration {
                strategy,
                duration,
                volume_ml,
            } => {
                self.fire(trigger, strategy, Some(duration), volume_ml).await;
            }
        }
    }

    /// Borrow the guard, mainly for inspection in tests and diagnostics.
    pub fn guard(&self) -> &ActuationGuard<A, S, C> {
        &self.guard
    }

    async fn fire(
        &self,
        trigger: Trigger,
        strategy: Strategy,
        duration: Option<std::time::Duration>,
        volume_ml: Option<f64>,
    ) {
        let reason = fire_reason(strategy, volume_ml);
        match self.guard.try_fire(strategy, duration, volume_ml, &reason).await {
            Ok(FireOutcome::Started(operation)) => {
                tracing::debug!(?trigger, %operation, "pump operation started");
            }
            Ok(FireOutcome::Busy) => {
                tracing::debug!(?trigger, %strategy, "fire skipped, pump busy");
            }
            Err(err) => {
                tracing::error!(?trigger, %strategy, error = %err, "failed to fire pump");
            }
        }
    }
}

fn fire_reason(strategy: Strategy, volume_ml: Option<f64>) -> String {
    match strategy {
        Strategy::Manual => "manual override on".to_string(),
        Strategy::Scheduled => "schedule window active".to_string(),
        Strategy::Environment => "environment threshold held".to_string(),
        Strategy::Predictive => match volume_ml {
            Some(volume) => format!("predicted dose of {volume} ml"),
            None => "predicted dose".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{Trigger, trigger_queue};
    use chrono::TimeDelta;
    use pumphouse_domain::audit::AuditRecord;
    use pumphouse_domain::error::PumphouseError;
    use pumphouse_domain::pump::PumpState;
    use pumphouse_domain::sensor::{Reading, SensorChannel};
    use pumphouse_domain::settings::{ControlSettings, ScheduleEntry};
    use pumphouse_domain::time::{Timestamp, Weekday};
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("injected failure")]
    struct InjectedFailure;

    // ── In-memory settings store ───────────────────────────────────

    #[derive(Clone, Default)]
    struct InMemorySettings {
        doc: Arc<StdMutex<Option<ControlSettings>>>,
        failing: Arc<StdMutex<bool>>,
    }

    impl InMemorySettings {
        fn with(settings: ControlSettings) -> Self {
            Self {
                doc: Arc::new(StdMutex::new(Some(settings))),
                failing: Arc::new(StdMutex::new(false)),
            }
        }

        fn put(&self, settings: ControlSettings) {
            *self.doc.lock().unwrap() = Some(settings);
        }

        fn fail(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    impl SettingsStore for InMemorySettings {
        async fn get(&self) -> Result<Option<ControlSettings>, PumphouseError> {
            if *self.failing.lock().unwrap() {
                return Err(PumphouseError::storage(InjectedFailure));
            }
            Ok(self.doc.lock().unwrap().clone())
        }

        async fn set_mode_enabled(
            &self,
            strategy: Strategy,
            enabled: bool,
        ) -> Result<ControlSettings, PumphouseError> {
            let mut doc = self.doc.lock().unwrap();
            let mut settings = doc.clone().unwrap_or_default();
            settings.set_mode_enabled(strategy, enabled);
            *doc = Some(settings.clone());
            Ok(settings)
        }

        async fn set_schedule(
            &self,
            entries: Vec<ScheduleEntry>,
        ) -> Result<ControlSettings, PumphouseError> {
            let mut doc = self.doc.lock().unwrap();
            let mut settings = doc.clone().unwrap_or_default();
            settings.scheduled.entries = entries;
            *doc = Some(settings.clone());
            Ok(settings)
        }

        async fn set_thresholds(
            &self,
            thresholds: pumphouse_domain::settings::Thresholds,
        ) -> Result<ControlSettings, PumphouseError> {
            let mut doc = self.doc.lock().unwrap();
            let mut settings = doc.clone().unwrap_or_default();
            settings.environment.thresholds = thresholds;
            *doc = Some(settings.clone());
            Ok(settings)
        }
    }

    // ── In-memory sensor feed ──────────────────────────────────────

    #[derive(Clone, Default)]
    struct InMemoryFeed {
        snapshot: Arc<StdMutex<SensorSnapshot>>,
    }

    impl InMemoryFeed {
        fn record(&self, channel: SensorChannel, value: f64, at: Timestamp) {
            self.snapshot
                .lock()
                .unwrap()
                .set(channel, Reading::new(value, at));
        }
    }

    impl SensorFeed for InMemoryFeed {
        async fn latest(
            &self,
            channel: SensorChannel,
        ) -> Result<Option<Reading>, PumphouseError> {
            Ok(self.snapshot.lock().unwrap().get(channel))
        }
    }

    // ── Mock actuator / sink / clock ───────────────────────────────

    #[derive(Clone, Default)]
    struct MockPump {
        sent: Arc<StdMutex<Vec<PumpState>>>,
    }

    impl MockPump {
        fn sent(&self) -> Vec<PumpState> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl ActuatorChannel for MockPump {
        async fn send(&self, state: PumpState) -> Result<(), PumphouseError> {
            self.sent.lock().unwrap().push(state);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MockSink {
        records: Arc<StdMutex<Vec<AuditRecord>>>,
    }

    impl AuditSink for MockSink {
        async fn append(&self, record: AuditRecord) -> Result<(), PumphouseError> {
            self.records.lock().unwrap().push(record);
            Ok(())
        }
    }

    #[derive(Clone)]
    struct ManualClock(Arc<StdMutex<Timestamp>>);

    impl ManualClock {
        fn starting_at(ts: &str) -> Self {
            Self(Arc::new(StdMutex::new(ts.parse().unwrap())))
        }

        fn advance_secs(&self, seconds: i64) {
            let mut now = self.0.lock().unwrap();
            *now += TimeDelta::seconds(seconds);
        }

        fn now(&self) -> Timestamp {
            *self.0.lock().unwrap()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            *self.0.lock().unwrap()
        }
    }

    struct Fixture {
        settings: InMemorySettings,
        feed: InMemoryFeed,
        pump: MockPump,
        clock: ManualClock,
        control: ControlLoop<
            InMemorySettings,
            InMemoryFeed,
            crate::oracle::LinearModelOracle,
            MockPump,
            MockSink,
            ManualClock,
        >,
    }

    fn fixture(initial: ControlSettings) -> Fixture {
        let settings = InMemorySettings::with(initial);
        let feed = InMemoryFeed::default();
        let pump = MockPump::default();
        let sink = MockSink::default();
        // Monday noon.
        let clock = ManualClock::starting_at("2025-06-02T12:00:00Z");
        let (_handle, rx) = trigger_queue(8);
        let control = ControlLoop::new(
            settings.clone(),
            feed.clone(),
            crate::oracle::LinearModelOracle::default(),
            pump.clone(),
            sink,
            clock.clone(),
            rx,
        );
        Fixture {
            settings,
            feed,
            pump,
            clock,
            control,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_dose_once_when_hot_condition_holds_for_hold_window() {
        let mut initial = ControlSettings::default();
        initial.environment.enabled = true;
        initial.environment.thresholds.temperature_max = Some(30.0);
        let mut fx = fixture(initial);

        // Temperature 31 °C sampled every 5 s for 35 s.
        for step in 0..=6 {
            fx.feed
                .record(SensorChannel::Temperature, 31.0, fx.clock.now());
            fx.control
                .step(Trigger::SensorSample(SensorChannel::Temperature))
                .await;
            if step < 6 {
                fx.clock.advance_secs(5);
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }

        // The hold was satisfied on the 30 s sample: one dose, running.
        assert_eq!(fx.pump.sent(), vec![PumpState::On]);
        assert!(fx.control.guard().is_busy().await);

        // Further samples while the dose runs do not overlap commands.
        fx.control
            .step(Trigger::SensorSample(SensorChannel::Temperature))
            .await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On]);

        // The fixed 120 s dose shuts off on its own.
        fx.clock.advance_secs(121);
        tokio::time::sleep(Duration::from_secs(121)).await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On, PumpState::Off]);
        assert!(!fx.control.guard().is_busy().await);

        // Condition still true, latch still held: no second dose.
        fx.control
            .step(Trigger::SensorSample(SensorChannel::Temperature))
            .await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On, PumpState::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_track_manual_toggle() {
        let mut initial = ControlSettings::default();
        initial.manual.enabled = true;
        let mut fx = fixture(initial);

        fx.control.step(Trigger::SettingsChanged).await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On]);

        // Repeated passes keep it on without resending.
        fx.control.step(Trigger::Tick).await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On]);

        let mut off = ControlSettings::default();
        off.manual.enabled = false;
        fx.settings.put(off);
        fx.control.step(Trigger::SettingsChanged).await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On, PumpState::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_open_and_close_schedule_window_on_ticks() {
        let mut initial = ControlSettings::default();
        initial.scheduled.enabled = true;
        initial.scheduled.entries = vec![ScheduleEntry {
            id: pumphouse_domain::id::ScheduleEntryId::new(),
            start: "12:00".parse().unwrap(),
            end: "12:01".parse().unwrap(),
            days: [Weekday::Mon].into_iter().collect(),
            active: true,
        }];
        let mut fx = fixture(initial);

        fx.control.step(Trigger::Tick).await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On]);

        // Two minutes later the window has closed.
        fx.clock.advance_secs(120);
        fx.control.step(Trigger::Tick).await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On, PumpState::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_survive_settings_store_failure() {
        let mut initial = ControlSettings::default();
        initial.manual.enabled = true;
        let mut fx = fixture(initial);
        fx.settings.fail(true);

        fx.control.step(Trigger::Tick).await;

        // Degraded to idle, nothing fired, nothing panicked.
        assert!(fx.pump.sent().is_empty());

        // And the loop recovers on the next good cycle.
        fx.settings.fail(false);
        fx.control.step(Trigger::Tick).await;
        assert_eq!(fx.pump.sent(), vec![PumpState::On]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_fire_predictive_dose_and_log_volume() {
        let mut initial = ControlSettings::default();
        initial.predictive.enabled = true;
        let mut fx = fixture(initial);
        let now = fx.clock.now();
        fx.feed.record(SensorChannel::Temperature, 35.0, now);
        fx.feed.record(SensorChannel::Humidity, 20.0, now);
        fx.feed.record(SensorChannel::Light, 400.0, now);

        fx.control
            .step(Trigger::SensorSample(SensorChannel::Humidity))
            .await;

        // 35*3.2 + 20*(-0.8) + 400*0.05 - 15 = 101 ml → ~33.7 s dose.
        assert_eq!(fx.pump.sent(), vec![PumpState::On]);
        let op = fx.control.guard().active_operation().await.unwrap();
        assert_eq!(op.strategy, Strategy::Predictive);
        let planned = op.planned_duration.unwrap();
        assert!((planned.as_secs_f64() - 101.0 / 3.0).abs() < 0.01);
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_via_trigger_queue_until_handles_drop() {
        let mut initial = ControlSettings::default();
        initial.manual.enabled = true;
        let settings = InMemorySettings::with(initial);
        let feed = InMemoryFeed::default();
        let pump = MockPump::default();
        let clock = ManualClock::starting_at("2025-06-02T12:00:00Z");
        let (handle, rx) = trigger_queue(8);
        let control = ControlLoop::new(
            settings,
            feed,
            crate::oracle::LinearModelOracle::default(),
            pump.clone(),
            MockSink::default(),
            clock,
            rx,
        );
        let task = tokio::spawn(control.run());

        handle.settings_changed().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(pump.sent(), vec![PumpState::On]);

        drop(handle);
        task.await.unwrap();
    }
}
