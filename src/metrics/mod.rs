pub mod record;
pub mod store;
pub mod writer;

pub use record::ServiceRequestRecord;
pub use store::RecordStore;
pub use writer::WriteReport;

use crate::clock::Timestamp;

/// Lifecycle points observed by the transport rather than by this process.
/// This is the "input" side — the hosting transport fills in whatever its
/// own instrumentation knows and hands it to the capture hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportTimestamps {
    /// When the request left the sender
    pub source: Option<Timestamp>,
    /// When the request arrived at the receiving transport
    pub destination: Option<Timestamp>,
}

impl TransportTimestamps {
    pub fn new(source: Option<Timestamp>, destination: Option<Timestamp>) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Neither point was supplied.
    pub fn unset() -> Self {
        Self::default()
    }

    /// A send time later than the receive time cannot be trusted; keep the
    /// receive side and forget the source.
    pub(crate) fn normalized(self) -> Self {
        match (self.source, self.destination) {
            (Some(source), Some(destination)) if source > destination => {
                tracing::warn!(
                    %source,
                    %destination,
                    "transport source timestamp is after destination; discarding source"
                );
                Self {
                    source: None,
                    destination: Some(destination),
                }
            }
            _ => self,
        }
    }
}
