use axum::{extract::State, Json};
use std::sync::Arc;

use crate::capture::EmptyResponse;
use crate::metrics::TransportTimestamps;
use crate::AppState;

// ─── POST /empty ─────────────────────────────────────────────────

/// The instrumented endpoint. Any request body is ignored.
///
/// HTTP carries no send/receive instrumentation, so both transport points
/// stay unset.
pub async fn call_empty(State(state): State<Arc<AppState>>) -> Json<EmptyResponse> {
    Json(state.node.handle(TransportTimestamps::unset()))
}
