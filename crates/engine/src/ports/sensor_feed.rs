//! Sensor feed port — latest value per channel.

use std::future::Future;

use pumphouse_domain::error::PumphouseError;
use pumphouse_domain::sensor::{Reading, SensorChannel, SensorSnapshot};

/// Supplies the latest sample per sensor channel.
///
/// The engine treats whatever `latest` returns as current; staleness is
/// not enforced here.
pub trait SensorFeed {
    /// The latest reading on a channel, or `None` if no sample has
    /// arrived yet.
    fn latest(
        &self,
        channel: SensorChannel,
    ) -> impl Future<Output = Result<Option<Reading>, PumphouseError>> + Send;

    /// Assemble a snapshot of all channels.
    fn snapshot(&self) -> impl Future<Output = Result<SensorSnapshot, PumphouseError>> + Send
    where
        Self: Sync,
    {
        async {
            let mut snapshot = SensorSnapshot::default();
            for channel in SensorChannel::ALL {
                if let Some(reading) = self.latest(channel).await? {
                    snapshot.set(channel, reading);
                }
            }
            Ok(snapshot)
        }
    }
}

impl<T: SensorFeed + Send + Sync> SensorFeed for std::sync::Arc<T> {
    fn latest(
        &self,
        channel: SensorChannel,
    ) -> impl Future<Output = Result<Option<Reading>, PumphouseError>> + Send {
        (**self).latest(channel)
    }
}
