//! Per-connection delta protocol behind the `/events` endpoint.
//!
//! A `DeltaCursor` remembers how many bench and cache rows a connection has
//! already been sent. Because both logs are append-only, comparing a cursor
//! with the log length is enough to find new rows; no per-client buffer is
//! kept on the server and any number of connections can progress
//! independently.
//!
//! Lifecycle of one connection:
//! - attach: both cursors start at the current log lengths, so only rows
//!   appended after connecting are streamed (the backlog comes from the
//!   snapshot endpoints)
//! - each tick: emit one `Delta` holding whatever rows are new
//! - once the feed has ended, the cache sampler has taken its final sample
//!   and both cursors have caught up: emit `Done` and close

use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;

use crate::record::{BenchRecord, CacheRecord};
use crate::store::SharedStores;

/// Rows appended to the logs since the previous delta of a connection.
///
/// At least one side is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Delta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bench: Option<Vec<BenchRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<Vec<CacheRecord>>,
}

impl Delta {
    /// Total rows carried by this delta.
    pub fn rows(&self) -> usize {
        self.bench.as_ref().map_or(0, Vec::len) + self.cache.as_ref().map_or(0, Vec::len)
    }
}

/// One message on the event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Delta(Delta),
    Done,
}

/// Read position of one streaming connection.
#[derive(Debug)]
pub struct DeltaCursor {
    stores: SharedStores,
    bench: usize,
    cache: usize,
    closed: bool,
}

impl DeltaCursor {
    /// Attaches at the current end of both logs.
    pub fn attach(stores: SharedStores) -> Self {
        let bench = stores.bench.len();
        let cache = stores.cache.len();
        Self {
            stores,
            bench,
            cache,
            closed: false,
        }
    }

    /// Bench rows already accounted for (backlog at attach + rows streamed).
    pub fn bench_position(&self) -> usize {
        self.bench
    }

    pub fn cache_position(&self) -> usize {
        self.cache
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Runs one tick of the protocol and returns the frames to send.
    ///
    /// Yields at most one `Delta` followed by at most one `Done`. After
    /// `Done` the cursor is closed and every further call returns nothing.
    pub fn step(&mut self) -> Vec<Frame> {
        if self.closed {
            return Vec::new();
        }

        // Latches first: writers append before setting them, so if they are
        // set now the copies below contain every row there will ever be.
        let finished = self.stores.is_finished();

        let (bench, bench_end) = self.stores.bench.since(self.bench);
        self.bench = bench_end;
        let (cache, cache_end) = self.stores.cache.since(self.cache);
        self.cache = cache_end;

        let mut frames = Vec::with_capacity(2);
        if !bench.is_empty() || !cache.is_empty() {
            frames.push(Frame::Delta(Delta {
                bench: (!bench.is_empty()).then_some(bench),
                cache: (!cache.is_empty()).then_some(cache),
            }));
        }

        if finished {
            frames.push(Frame::Done);
            self.closed = true;
        }

        frames
    }
}

/// Stream of frames for one connection, polling the stores every `period`.
///
/// The cursor attaches when this function is called. The first tick runs
/// immediately; the stream ends right after `Frame::Done`. Dropping the
/// stream (client went away) stops the loop.
pub fn delta_frames(stores: SharedStores, period: Duration) -> impl Stream<Item = Frame> + Send {
    let cursor = DeltaCursor::attach(stores);

    stream::unfold((cursor, true), move |(mut cursor, first)| async move {
        if cursor.is_closed() {
            return None;
        }
        if !first {
            sleep(period).await;
        }
        let frames = cursor.step();
        Some((frames, (cursor, false)))
    })
    .flat_map(stream::iter)
}
