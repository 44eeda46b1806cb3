//! Simulated sensor feed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::sensor::{Reading, SensorChannel, SensorSnapshot};
use pumphouse_domain::time::Timestamp;
use pumphouse_engine::ports::{Clock, SensorFeed};
use pumphouse_engine::trigger::TriggerHandle;

/// In-memory latest-value store implementing the `SensorFeed` port.
#[derive(Clone, Default)]
pub struct VirtualSensorFeed {
    snapshot: Arc<RwLock<SensorSnapshot>>,
}

impl VirtualSensorFeed {
    /// Create an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new sample on a channel.
    pub async fn record(&self, channel: SensorChannel, value: f64, observed_at: Timestamp) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.set(channel, Reading::new(value, observed_at));
    }
}

impl SensorFeed for VirtualSensorFeed {
    async fn latest(&self, channel: SensorChannel) -> Result<Option<Reading>, PumphouseError> {
        Ok(self.snapshot.read().await.get(channel))
    }
}

/// Spawn a task that feeds slowly drifting readings into `feed` and
/// wakes the engine after each round of samples.
///
/// The waveform is deterministic (sinusoidal drift around greenhouse-ish
/// baselines), which keeps demo runs reproducible.
pub fn spawn_simulator<C>(
    feed: VirtualSensorFeed,
    triggers: TriggerHandle,
    clock: C,
    period: Duration,
) -> JoinHandle<()>
where
    C: Clock + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut step: u32 = 0;
        loop {
            interval.tick().await;
            let now = clock.now();
            let phase = f64::from(step);

            feed.record(
                SensorChannel::Temperature,
                26.0 + 5.0 * (phase / 20.0).sin(),
                now,
            )
            .await;
            feed.record(
                SensorChannel::Humidity,
                55.0 + 15.0 * (phase / 28.0).cos(),
                now,
            )
            .await;
            feed.record(
                SensorChannel::Light,
                400.0 + 350.0 * (phase / 40.0).sin(),
                now,
            )
            .await;

            for channel in SensorChannel::ALL {
                triggers.sensor_sample(channel).await;
            }

            step = step.wrapping_add(1);
            tracing::trace!(step, "virtual sensor round published");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumphouse_engine::ports::SystemClock;
    use pumphouse_engine::trigger::{Trigger, trigger_queue};

    #[tokio::test]
    async fn should_return_latest_recorded_value() {
        let feed = VirtualSensorFeed::new();
        let ts = pumphouse_domain::time::now();
        feed.record(SensorChannel::Temperature, 31.0, ts).await;
        feed.record(SensorChannel::Temperature, 29.5, ts).await;

        let reading = feed.latest(SensorChannel::Temperature).await.unwrap();
        assert_eq!(reading.map(|r| r.value), Some(29.5));
        assert!(feed.latest(SensorChannel::Light).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_assemble_snapshot_from_all_channels() {
        let feed = VirtualSensorFeed::new();
        let ts = pumphouse_domain::time::now();
        feed.record(SensorChannel::Temperature, 25.0, ts).await;
        feed.record(SensorChannel::Humidity, 40.0, ts).await;

        let snapshot = feed.snapshot().await.unwrap();
        assert_eq!(snapshot.value(SensorChannel::Temperature), Some(25.0));
        assert_eq!(snapshot.value(SensorChannel::Humidity), Some(40.0));
        assert!(snapshot.value(SensorChannel::Light).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn should_publish_samples_and_triggers_periodically() {
        let feed = VirtualSensorFeed::new();
        let (handle, mut rx) = trigger_queue(16);
        let task = spawn_simulator(
            feed.clone(),
            handle,
            SystemClock,
            Duration::from_secs(5),
        );

        // First round fires immediately.
        for _ in 0..3 {
            assert!(matches!(rx.recv().await, Some(Trigger::SensorSample(_))));
        }
        assert!(
            feed.latest(SensorChannel::Temperature)
                .await
                .unwrap()
                .is_some()
        );

        task.abort();
    }
}
