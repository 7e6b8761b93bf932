//! Background sampler tasks for CPU usage and page-cache occupancy.
//!
//! The CPU sampler replaces the latest per-core snapshot on every tick. The
//! cache sampler appends to the cache log until the input feed ends, takes
//! one last sample, and stops. A failed counter read skips that tick only.

use std::path::Path;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info};

use crate::record::{round_to, CacheRecord};
use crate::state::SharedState;
use crate::system::{read_cpu_ticks, read_page_cache, CoreTicks};

/// Utilization of one core between two readings, in percent rounded to 0.1.
pub fn utilization(prev: CoreTicks, cur: CoreTicks) -> f64 {
    let total_delta = cur.total.saturating_sub(prev.total);
    let idle_delta = cur.idle.saturating_sub(prev.idle);
    let busy = 1.0 - idle_delta as f64 / total_delta.max(1) as f64;
    round_to(busy * 100.0, 1)
}

/// Per-core utilization, pairing cores by index.
pub fn core_utilization(prev: &[CoreTicks], cur: &[CoreTicks]) -> Vec<f64> {
    prev.iter()
        .zip(cur)
        .map(|(p, c)| utilization(*p, *c))
        .collect()
}

/// Samples /proc/stat forever and publishes per-core utilization.
pub async fn run_cpu_sampler(state: SharedState) {
    let proc_root = state.config.proc_root();
    let period = state.config.cpu_interval();
    debug!("CPU sampler started with {:?} interval", period);

    let mut previous = read_cpu_ticks(&proc_root)
        .map_err(|e| {
            debug!("Initial CPU tick read failed: {}", e);
            state.metrics.sampler_errors.with_label_values(&["cpu"]).inc();
        })
        .ok();

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match read_cpu_ticks(&proc_root) {
            Ok(current) => {
                if let Some(prev) = &previous {
                    state.stores.cpu.replace(core_utilization(prev, &current));
                }
                previous = Some(current);
            }
            Err(e) => {
                debug!("Skipping CPU sample: {}", e);
                state.metrics.sampler_errors.with_label_values(&["cpu"]).inc();
            }
        }
    }
}

/// Samples /proc/meminfo until the feed ends, plus one final sample.
///
/// Sets the `cache_final` latch when it stops.
pub async fn run_cache_sampler(state: SharedState) {
    let proc_root = state.config.proc_root();
    let period = state.config.cache_interval();
    debug!("Cache sampler started with {:?} interval", period);

    loop {
        let ended = state.stores.feed_ended.is_set();
        sample_cache(&state, &proc_root);
        if ended {
            break;
        }
        sleep(period).await;
    }

    state.stores.cache_final.set();
    info!(
        "Cache sampler stopped after {} samples",
        state.stores.cache.len()
    );
}

/// Takes one page-cache sample and appends it. Returns whether it succeeded.
pub fn sample_cache(state: &SharedState, proc_root: &Path) -> bool {
    match read_page_cache(proc_root) {
        Ok(reading) => {
            let record = CacheRecord::new(
                state.started.elapsed().as_secs_f64(),
                reading.cache_pct,
                reading.cache_gb,
                reading.total_gb,
            );
            state.stores.cache.append(record);
            state.metrics.cache_samples.inc();
            true
        }
        Err(e) => {
            debug!("Skipping cache sample: {}", e);
            state.metrics.sampler_errors.with_label_values(&["cache"]).inc();
            false
        }
    }
}
