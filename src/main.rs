use std::process::ExitCode;
use std::sync::Arc;

use instrumented_service::{load_config, server, AppState, InstrumentedNode};

#[tokio::main]
async fn main() -> ExitCode {
    // ── 1. Configuration ─────────────────────────────────────────
    let cfg = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    // ── 2. Logging ───────────────────────────────────────────────
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   ⏱  INSTRUMENTED SERVICE                        ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 3. Service instance (start time is captured here) ───────
    let state = Arc::new(AppState::new(InstrumentedNode::new(&cfg)));

    // ── 4. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state.clone());

    // ── 5. Bind & serve until a shutdown signal ─────────────────
    let listener = match tokio::net::TcpListener::bind(&cfg.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %cfg.listen_addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(name = %cfg.name, addr = %cfg.listen_addr, "listening; POST /empty");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await;
    if let Err(e) = &served {
        tracing::error!(error = %e, "server exited with error");
    }

    // ── 6. Persist the record log ────────────────────────────────
    // All connections are drained at this point; nothing appends anymore.
    match state.node.shutdown() {
        Ok(report) => {
            tracing::info!(
                path = %report.path.display(),
                records = report.records,
                "shutdown complete"
            );
            if served.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "record log was not fully persisted");
            ExitCode::FAILURE
        }
    }
}
