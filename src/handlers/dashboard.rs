//! Dashboard page and fallback handlers.

use axum::{extract::State, http::StatusCode, response::Html};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Static dashboard page. Loads `/data` and `/cache`, then follows `/events`
/// and polls `/cpu` once per second.
pub const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Handler for the / endpoint.
#[instrument(skip(state))]
pub async fn index_handler(State(state): State<SharedState>) -> Html<&'static str> {
    debug!("Processing / request");
    state.health_stats.record_http_request();
    Html(DASHBOARD_HTML)
}

/// Handler for every unknown route.
pub async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}
