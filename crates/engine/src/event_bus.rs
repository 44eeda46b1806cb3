//! In-process pump event bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use pumphouse_domain::audit::AuditRecord;
use pumphouse_domain::error::PumphouseError;

use crate::ports::AuditSink;

/// In-process bus broadcasting every audit record as a live pump event.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct PumpEventBus {
    sender: broadcast::Sender<AuditRecord>,
}

impl PumpEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to pump events on this bus.
    ///
    /// Returns a receiver that will get all records published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuditRecord> {
        self.sender.subscribe()
    }
}

impl AuditSink for PumpEventBus {
    async fn append(&self, record: AuditRecord) -> Result<(), PumphouseError> {
        // broadcast::send fails only when there are zero receivers,
        // which is fine — we simply ignore the error.
        let _ = self.sender.send(record);
        Ok(())
    }
}

/// Fans one audit record out to two sinks (e.g. persistent log + bus).
pub struct FanoutSink<A, B>(pub A, pub B);

impl<A, B> AuditSink for FanoutSink<A, B>
where
    A: AuditSink + Send + Sync,
    B: AuditSink + Send + Sync,
{
    async fn append(&self, record: AuditRecord) -> Result<(), PumphouseError> {
        let first = self.0.append(record.clone()).await;
        let second = self.1.append(record).await;
        first.and(second)
    }
}

impl<A: Clone, B: Clone> Clone for FanoutSink<A, B> {
    fn clone(&self) -> Self {
        Self(self.0.clone(), self.1.clone())
    }
}
