//! HTTP endpoint handlers for the dashboard server.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: Dashboard page
//! - `/data`, `/cache`, `/cpu`: Snapshot and poll endpoints
//! - `/events`: Server-Sent Events delta stream
//! - `/health`: Server statistics
//! - `/metrics`: Prometheus telemetry

use axum::{routing::get, Router};

use crate::state::SharedState;

pub mod dashboard;
pub mod events;
pub mod health;
pub mod metrics;
pub mod snapshot;

// Re-export handlers
pub use dashboard::{index_handler, not_found_handler};
pub use events::events_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use snapshot::{cache_handler, cpu_handler, data_handler};

/// Builds the application router, honoring the endpoint feature flags.
pub fn build_router(state: SharedState) -> Router {
    let mut app = Router::new()
        .route("/", get(index_handler))
        .route("/data", get(data_handler))
        .route("/cache", get(cache_handler))
        .route("/cpu", get(cpu_handler))
        .route("/events", get(events_handler));

    if state.config.health_enabled() {
        app = app.route("/health", get(health_handler));
    }

    if state.config.telemetry_enabled() {
        app = app.route("/metrics", get(metrics_handler));
    }

    app.fallback(not_found_handler).with_state(state)
}
