//! Snapshot and poll endpoints.
//!
//! Each request copies the current contents of one store. Nothing here
//! mutates a store, so the handlers are idempotent.

use axum::{
    extract::State,
    http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
    response::{IntoResponse, Json},
};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the /data endpoint: every bench row received so far.
#[instrument(skip(state))]
pub async fn data_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.health_stats.record_http_request();
    let rows = state.stores.bench.snapshot();
    debug!("Serving {} bench rows", rows.len());
    ([(ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(rows))
}

/// Handler for the /cache endpoint: every page cache sample so far.
#[instrument(skip(state))]
pub async fn cache_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.health_stats.record_http_request();
    let rows = state.stores.cache.snapshot();
    debug!("Serving {} cache rows", rows.len());
    ([(ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(rows))
}

/// Handler for the /cpu endpoint: latest per-core utilization.
#[instrument(skip(state))]
pub async fn cpu_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.health_stats.record_http_request();
    ([(ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(state.stores.cpu.get()))
}
