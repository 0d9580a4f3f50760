use parking_lot::Mutex;

use super::ServiceRequestRecord;

// ─── Configuration ───────────────────────────────────────────────

/// Initial capacity; the store grows without bound after that.
const INITIAL_CAPACITY: usize = 1024;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe, append-only record log for one service instance.
/// Handlers call `append()`, shutdown calls `close()` exactly once.
pub struct RecordStore {
    inner: Mutex<Inner>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    // Arrival order
    records: Vec<ServiceRequestRecord>,
    // Set once the records have been handed to the writer
    closed: bool,
}

// ─── RecordStore impl ────────────────────────────────────────────

impl RecordStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: Vec::with_capacity(INITIAL_CAPACITY),
                closed: false,
            }),
        }
    }

    /// Append one completed record. The lock covers only the push.
    ///
    /// Returns `false` if the store was already closed, in which case the
    /// record is discarded and a warning is logged.
    pub fn append(&self, record: ServiceRequestRecord) -> bool {
        let mut inner = self.inner.lock();
        if inner.closed {
            drop(inner);
            tracing::warn!(%record, "record arrived after shutdown; discarded");
            return false;
        }
        inner.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Copy of everything appended so far, in arrival order.
    pub fn snapshot(&self) -> Vec<ServiceRequestRecord> {
        self.inner.lock().records.clone()
    }

    /// Seal the store and take its contents. Only the first call gets the
    /// records; every later call returns `None`.
    pub fn close(&self) -> Option<Vec<ServiceRequestRecord>> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return None;
        }
        inner.closed = true;
        Some(std::mem::take(&mut inner.records))
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
