//! mmapbench-live: live dashboard server for mmapbench output.
//!
//! The server ingests benchmark CSV rows from a feed, samples per-core CPU
//! usage and page cache occupancy from /proc, and serves everything to a
//! browser dashboard. The browser loads the backlog from the snapshot
//! endpoints and then follows `/events`, a Server-Sent Events stream that
//! carries only rows appended since it connected.

pub mod cli;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod health_stats;
pub mod ingest;
pub mod metrics;
pub mod record;
pub mod sampler;
pub mod state;
pub mod store;
pub mod stream;
pub mod system;

pub use record::{BenchRecord, CacheRecord};
pub use state::{AppState, SharedState};
pub use store::{AppendLog, Latch, LatestValue, Stores};
