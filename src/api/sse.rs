//! Server-Sent Events support

use crate::runtime::{SessionView, SseEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream, starting with the current view
pub fn sse_stream(
    current: SessionView,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = SseEvent::Snapshot { view: current };
    let init = futures::stream::once(async move { Ok(sse_event_to_axum(&init)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(sse_event_to_axum(&event))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn sse_event_to_axum(event: &SseEvent) -> Event {
    let event_type = match event {
        SseEvent::Snapshot { .. } => "snapshot",
        SseEvent::Notice { .. } => "notice",
    };

    let data = serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize SSE event");
        r#"{"type":"error"}"#.to_string()
    });

    Event::default().event(event_type).data(data)
}
