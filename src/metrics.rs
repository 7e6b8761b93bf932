//! Prometheus telemetry for mmapbench-live.
//!
//! These metrics describe the server itself (rows ingested, lines dropped,
//! open streams), not the benchmark data it relays.

use prometheus::{Gauge, IntCounter, IntCounterVec, Opts, Registry};

/// Collection of Prometheus metrics for the dashboard server.
#[derive(Clone)]
pub struct DashboardMetrics {
    pub bench_rows: IntCounter,
    pub lines_discarded: IntCounter,
    pub cache_samples: IntCounter,
    pub sampler_errors: IntCounterVec,
    pub stream_clients: Gauge,
    pub feed_ended: Gauge,
}

impl DashboardMetrics {
    /// Creates and registers all metrics with the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let bench_rows = IntCounter::new(
            "mmapbench_live_bench_rows_total",
            "Benchmark rows parsed and stored",
        )?;
        let lines_discarded = IntCounter::new(
            "mmapbench_live_lines_discarded_total",
            "Input lines dropped as blank, header or malformed",
        )?;
        let cache_samples = IntCounter::new(
            "mmapbench_live_cache_samples_total",
            "Page cache samples stored",
        )?;
        let sampler_errors = IntCounterVec::new(
            Opts::new(
                "mmapbench_live_sampler_errors_total",
                "Failed counter reads per sampler",
            ),
            &["sampler"],
        )?;
        let stream_clients = Gauge::new(
            "mmapbench_live_stream_clients",
            "Currently open /events connections",
        )?;
        let feed_ended = Gauge::new(
            "mmapbench_live_feed_ended",
            "Whether the input feed has ended (1) or is still open (0)",
        )?;

        registry.register(Box::new(bench_rows.clone()))?;
        registry.register(Box::new(lines_discarded.clone()))?;
        registry.register(Box::new(cache_samples.clone()))?;
        registry.register(Box::new(sampler_errors.clone()))?;
        registry.register(Box::new(stream_clients.clone()))?;
        registry.register(Box::new(feed_ended.clone()))?;

        Ok(Self {
            bench_rows,
            lines_discarded,
            cache_samples,
            sampler_errors,
            stream_clients,
            feed_ended,
        })
    }
}
