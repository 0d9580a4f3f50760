//! Per-request lifecycle capture.
//!
//! [`Instrumented`] wraps any [`Service`] and records one
//! [`ServiceRequestRecord`] per call. The callback timestamp is read before
//! the inner handler runs and the response-sent timestamp right before
//! control goes back to the caller. The record is completed by a drop guard,
//! so a handler that returns an error or panics still leaves a record behind.

use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;

use crate::clock::{self, Timestamp};
use crate::metrics::{RecordStore, ServiceRequestRecord, TransportTimestamps};

/// A synchronous request/response endpoint.
pub trait Service: Send + Sync {
    type Request;
    type Response;
    type Error;

    fn handle(&self, request: Self::Request) -> Result<Self::Response, Self::Error>;
}

// ─── The empty service ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRequest {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmptyResponse {}

/// Answers an empty request with an empty response.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyService;

impl Service for EmptyService {
    type Request = EmptyRequest;
    type Response = EmptyResponse;
    type Error = Infallible;

    fn handle(&self, _request: EmptyRequest) -> Result<EmptyResponse, Infallible> {
        Ok(EmptyResponse {})
    }
}

// ─── Instrumentation wrapper ─────────────────────────────────────

pub struct Instrumented<S> {
    inner: S,
    store: Arc<RecordStore>,
}

impl<S: Service> Instrumented<S> {
    pub fn new(inner: S, store: Arc<RecordStore>) -> Self {
        Self { inner, store }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Run the inner handler and log its lifecycle. The handler's own result
    /// (or panic) is passed through untouched.
    pub fn handle(
        &self,
        transport: TransportTimestamps,
        request: S::Request,
    ) -> Result<S::Response, S::Error> {
        let _guard = CaptureGuard::start(&self.store, transport);
        self.inner.handle(request)
    }
}

/// Holds the callback timestamp of one in-flight request and appends the
/// finished record when dropped.
struct CaptureGuard<'a> {
    store: &'a RecordStore,
    transport: TransportTimestamps,
    callback_timestamp: Timestamp,
}

impl<'a> CaptureGuard<'a> {
    #[inline]
    fn start(store: &'a RecordStore, transport: TransportTimestamps) -> Self {
        Self {
            callback_timestamp: clock::now(),
            store,
            transport,
        }
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        let response_sent_timestamp = clock::now();
        if std::thread::panicking() {
            tracing::debug!("handler panicked; recording lifecycle up to the failure");
        }
        self.store.append(ServiceRequestRecord::new(
            self.transport,
            self.callback_timestamp,
            response_sent_timestamp,
        ));
    }
}
