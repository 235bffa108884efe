//! SSE framing for the streaming trace emitter:
//! `event: <type>\ndata: <json>\n\n`, with intermediary buffering
//! disabled so analysts see progress as it happens rather than in one
//! burst at the end.

use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::StreamExt;
use gateway_cache::InMemoryCache;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use trace_engine::{AddressTraceRequest, StreamingTraceEmitter, TraceEvent};

/// Spec §4.8: "no buffering beyond one event is required".
const CHANNEL_CAPACITY: usize = 1;

fn to_sse_event(event: TraceEvent) -> Event {
 Event::default().event(event.event_name()).json_data(event.payload()).unwrap_or_else(|_| Event::default())
}

/// Runs the trace in a background task and returns the SSE response
/// the client receives. Dropping the response body (client disconnect)
/// drops `rx`, closing the channel the emitter is sending into; the
/// emitter observes that at its next `send` and stops issuing further
/// upstream fetches.
pub fn trace_stream_response(
 emitter: Arc<StreamingTraceEmitter<InMemoryCache>>,
 req: AddressTraceRequest,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
 let (tx, rx) = mpsc::channel::<TraceEvent>(CHANNEL_CAPACITY);

 tokio::spawn(async move {
 emitter.stream(req, tx).await;
 });

 let stream = ReceiverStream::new(rx).map(|event| Ok(to_sse_event(event)));
 Sse::new(stream).keep_alive(KeepAlive::default())
}
