use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::capture::{EmptyRequest, EmptyResponse, EmptyService, Instrumented};
use crate::clock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::metrics::{writer, RecordStore, TransportTimestamps, WriteReport};

/// One running instance of the instrumented empty service.
///
/// Records accumulate in memory for the instance's whole lifetime and are
/// written out by an explicit [`InstrumentedNode::shutdown`] call.
pub struct InstrumentedNode {
    name: String,
    start_time: DateTime<Utc>,
    output_dir: PathBuf,
    service: Instrumented<EmptyService>,
}

impl InstrumentedNode {
    pub fn new(config: &Config) -> Self {
        let node = Self {
            name: config.name.clone(),
            start_time: clock::now(),
            output_dir: config.output_dir.clone(),
            service: Instrumented::new(EmptyService, Arc::new(RecordStore::new())),
        };
        tracing::info!(name = %node.name, start_time = %node.start_time, "service instance started");
        node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn records(&self) -> &Arc<RecordStore> {
        self.service.store()
    }

    /// Handle one empty request.
    pub fn handle(&self, transport: TransportTimestamps) -> EmptyResponse {
        match self.service.handle(transport, EmptyRequest {}) {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Seal the record store and persist it. The first call owns the
    /// records; any later call fails with [`Error::AlreadyShutDown`].
    pub fn shutdown(&self) -> Result<WriteReport> {
        let records = self.records().close().ok_or(Error::AlreadyShutDown)?;
        tracing::info!(name = %self.name, records = records.len(), "shutting down");
        writer::write_records(&self.output_dir, &self.name, &self.start_time, &records)
    }
}

impl Drop for InstrumentedNode {
    fn drop(&mut self) {
        let store = self.records();
        if !store.is_closed() && !store.is_empty() {
            tracing::warn!(
                name = %self.name,
                records = store.len(),
                "service instance dropped without shutdown; records not persisted"
            );
        }
    }
}
