//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! server statistics and the state of the ingest and sampler tasks.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::state::SharedState;
use crate::store::Stores;

/// Handler for the /health endpoint.
///
/// Always answers 200: a finished or failed feed is a normal state for the
/// server, which keeps serving whatever it has.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    state.health_stats.record_http_request();

    let message = if state.stores.feed_ended.is_set() {
        "OK - Input ended"
    } else {
        "OK - Receiving input"
    };

    let table = state.health_stats.render_table();
    let stores = render_store_status(&state.stores);

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{message}\n\n{table}\n{stores}"),
    )
}

/// Renders store sizes and task state as a plain-text table.
fn render_store_status(stores: &Stores) -> String {
    let mut out = String::new();
    writeln!(out, "STORES").ok();
    writeln!(out, "======").ok();
    writeln!(out).ok();
    writeln!(out, "{:20} | {:>10}", "Store", "Entries").ok();
    writeln!(out, "{}", "-".repeat(33)).ok();
    writeln!(out, "{:20} | {:>10}", "bench rows", stores.bench.len()).ok();
    writeln!(out, "{:20} | {:>10}", "cache samples", stores.cache.len()).ok();
    writeln!(out, "{:20} | {:>10}", "cpu cores", stores.cpu.get().len()).ok();
    writeln!(out).ok();
    writeln!(out, "Feed ended: {}", stores.feed_ended.is_set()).ok();
    writeln!(out, "Cache sampler finished: {}", stores.cache_final.is_set()).ok();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_store_status() {
        let stores = Stores::new();
        stores.cpu.replace(vec![1.0, 2.0, 3.0]);
        stores.feed_ended.set();

        let text = render_store_status(&stores);
        assert!(text.contains("cpu cores"));
        assert!(text.contains("Feed ended: true"));
        assert!(text.contains("Cache sampler finished: false"));
    }
}
