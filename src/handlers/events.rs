//! Server-Sent Events endpoint.
//!
//! Each connection gets its own `DeltaCursor` loop (see `crate::stream`).
//! Deltas are sent as unnamed events carrying `{"bench": [...], "cache": [...]}`
//! and the stream ends with a single `done` event. A client that disconnects
//! drops the response body, which stops its loop.

use axum::{
    extract::State,
    http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
};
use futures::StreamExt;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::state::SharedState;
use crate::stream::{delta_frames, Frame};

/// Tracks one open stream for telemetry; closing is recorded on drop.
struct StreamSession {
    state: SharedState,
    opened: Instant,
}

impl StreamSession {
    fn open(state: SharedState) -> Self {
        state.metrics.stream_clients.inc();
        state.health_stats.record_stream_opened();
        Self {
            state,
            opened: Instant::now(),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        let elapsed = self.opened.elapsed().as_secs_f64();
        self.state.metrics.stream_clients.dec();
        self.state.health_stats.record_stream_closed(elapsed);
        debug!("Event stream closed after {:.1}s", elapsed);
    }
}

/// Converts a protocol frame into its SSE wire form.
pub fn frame_to_event(frame: &Frame) -> Result<Event, axum::Error> {
    match frame {
        Frame::Delta(delta) => Event::default().json_data(delta),
        Frame::Done => Ok(Event::default().event("done").data("{}")),
    }
}

/// Handler for the /events endpoint.
#[instrument(skip(state))]
pub async fn events_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.health_stats.record_http_request();

    let frames = delta_frames(state.stores.clone(), state.config.stream_interval());
    let session = StreamSession::open(state);
    debug!("Event stream opened");

    let events = frames.map(move |frame| {
        if let Frame::Delta(delta) = &frame {
            session.state.health_stats.record_stream_event(delta.rows());
        }
        frame_to_event(&frame)
    });

    ([(ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Sse::new(events))
}
