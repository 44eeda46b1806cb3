//! Server-Sent Events (SSE) stream of live pump events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use pumphouse_engine::ports::{AuditQuery, AuditSink, SensorFeed, SettingsStore};

use crate::state::AppState;

/// `GET /api/events/stream` — SSE stream of pump start/stop events.
///
/// Subscribes to the pump event bus and sends JSON-encoded audit records
/// as SSE `data:` frames. The stream continues until the client
/// disconnects or the event bus is closed.
pub async fn stream<SS, SF, AQ, AS>(
    State(state): State<AppState<SS, SF, AQ, AS>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    SS: SettingsStore + Send + Sync + 'static,
    SF: SensorFeed + Send + Sync + 'static,
    AQ: AuditQuery + Send + Sync + 'static,
    AS: AuditSink + Send + Sync + 'static,
{
    let event_rx = state.events.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(record) => match serde_json::to_string(&record) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize pump event for SSE stream");
                None
            }
        },
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}
