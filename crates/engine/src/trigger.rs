//! Scheduler trigger — the single queue that wakes the control loop.
//!
//! Every stimulus (periodic tick, new sensor sample, settings change)
//! funnels into one mpsc queue that the control loop drains. This keeps
//! ordering and serialization explicit: trigger sources never invoke the
//! decision pipeline directly.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use pumphouse_domain::sensor::SensorChannel;

/// Default depth of the trigger queue.
pub const TRIGGER_QUEUE_CAPACITY: usize = 64;

/// How often the periodic tick re-checks schedule windows.
pub const TICK_PERIOD: Duration = Duration::from_secs(60);

/// A stimulus that wakes the control loop for one decision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Coarse periodic tick for schedule-window checks.
    Tick,
    /// A new sample arrived on a sensor channel.
    SensorSample(SensorChannel),
    /// The settings document was mutated.
    SettingsChanged,
}

/// Create a trigger queue of the given capacity.
#[must_use]
pub fn trigger_queue(capacity: usize) -> (TriggerHandle, mpsc::Receiver<Trigger>) {
    let (tx, rx) = mpsc::channel(capacity);
    (TriggerHandle { tx }, rx)
}

/// Cloneable sending side of the trigger queue, handed to adapters.
#[derive(Clone)]
pub struct TriggerHandle {
    tx: mpsc::Sender<Trigger>,
}

impl TriggerHandle {
    /// Enqueue a trigger.
    ///
    /// A full queue applies backpressure; a closed queue (engine shut
    /// down) is logged and otherwise ignored.
    pub async fn notify(&self, trigger: Trigger) {
        if self.tx.send(trigger).await.is_err() {
            tracing::debug!(?trigger, "trigger dropped, control loop has stopped");
        }
    }

    /// Enqueue a sensor-sample trigger.
    pub async fn sensor_sample(&self, channel: SensorChannel) {
        self.notify(Trigger::SensorSample(channel)).await;
    }

    /// Enqueue a settings-changed trigger.
    pub async fn settings_changed(&self) {
        self.notify(Trigger::SettingsChanged).await;
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawn the periodic tick task.
///
/// The first tick fires immediately so the engine resolves once at
/// startup; missed ticks are skipped rather than bursted. The task ends
/// when the control loop drops its receiver.
pub fn spawn_tick(handle: TriggerHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if handle.is_closed() {
                break;
            }
            handle.notify(Trigger::Tick).await;
        }
    })
}
