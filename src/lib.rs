//! Latency instrumentation for a single request/response endpoint.
//!
//! Every request handled by an [`InstrumentedNode`] leaves one
//! [`ServiceRequestRecord`] of lifecycle timestamps in memory; the whole log
//! is written as CSV when the node is shut down.

pub mod capture;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod node;
pub mod server;

pub use config::{load_config, Config};
pub use error::{Error, Result};
pub use metrics::{RecordStore, ServiceRequestRecord, TransportTimestamps, WriteReport};
pub use node::InstrumentedNode;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// The instrumented service instance; owns the record store.
    pub node: InstrumentedNode,
}

impl AppState {
    pub fn new(node: InstrumentedNode) -> Self {
        Self { node }
    }
}
