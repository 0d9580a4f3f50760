use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Records held in memory, waiting for shutdown
    pub records: usize,
    /// false once the store has been handed to the writer
    pub accepting: bool,
}

// ─── GET /api/status ─────────────────────────────────────────────

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    let store = state.node.records();
    Json(ServiceStatus {
        name: state.node.name().to_owned(),
        start_time: state.node.start_time(),
        records: store.len(),
        accepting: !store.is_closed(),
    })
}
