use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the Axum `Router` that stands in for the request transport.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── The instrumented endpoint ───────────────────────────
        .route("/empty", post(handlers::empty::call_empty))
        // ── Operator status ─────────────────────────────────────
        .route("/api/status", get(handlers::status::get_status))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware ───────────────────────────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
}

/// Resolves on Ctrl+C or SIGTERM. Axum then stops accepting connections and
/// drains in-flight requests before `serve` returns.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
