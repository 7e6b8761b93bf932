//! Application state management for the dashboard server.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers and used by the background ingest and sampler tasks.

use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::health_stats::HealthStats;
use crate::metrics::DashboardMetrics;
use crate::store::{SharedStores, Stores};

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests and background tasks.
pub struct AppState {
    pub stores: SharedStores,
    pub config: Arc<Config>,
    pub registry: Registry,
    pub metrics: DashboardMetrics,
    pub health_stats: Arc<HealthStats>,
    /// Reference point for cache sample timestamps.
    pub started: Instant,
}

impl AppState {
    /// Creates empty stores and registers telemetry for `config`.
    pub fn new(config: Config) -> Result<SharedState, prometheus::Error> {
        let registry = Registry::new();
        let metrics = DashboardMetrics::new(&registry)?;

        Ok(Arc::new(Self {
            stores: Arc::new(Stores::new()),
            config: Arc::new(config),
            registry,
            metrics,
            health_stats: Arc::new(HealthStats::new()),
            started: Instant::now(),
        }))
    }
}
