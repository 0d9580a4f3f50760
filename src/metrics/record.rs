use std::fmt;
use std::str::FromStr;

use crate::clock::{self, Timestamp};
use crate::error::Error;

use super::TransportTimestamps;

// ─── Column layout ───────────────────────────────────────────────

const CSV_HEADER: &str =
    "source timestamp, destination timestamp, callback timestamp, response sent timestamp";

const CSV_COLUMNS: usize = 4;

// ─── ServiceRequestRecord ────────────────────────────────────────

/// Lifecycle timestamps of one observed request.
///
/// Built once, after the handler returned, and never mutated afterwards.
/// Construction enforces the ordering invariants:
///
///   callback_timestamp <= response_sent_timestamp
///   source_timestamp   <= destination_timestamp   (when both are set)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRequestRecord {
    source_timestamp: Timestamp,
    destination_timestamp: Timestamp,
    callback_timestamp: Timestamp,
    response_sent_timestamp: Timestamp,
}

impl ServiceRequestRecord {
    pub fn new(
        transport: TransportTimestamps,
        callback_timestamp: Timestamp,
        response_sent_timestamp: Timestamp,
    ) -> Self {
        let transport = transport.normalized();

        Self {
            source_timestamp: transport.source.unwrap_or_else(clock::unset),
            destination_timestamp: transport
                .destination
                .unwrap_or_else(clock::unset),
            callback_timestamp,
            // The wall clock may step backwards between the two reads
            response_sent_timestamp: response_sent_timestamp
                .max(callback_timestamp),
        }
    }

    /// When the request left the sender, or the sentinel.
    pub fn source_timestamp(&self) -> Timestamp {
        self.source_timestamp
    }

    /// When the request reached the receiving transport, or the sentinel.
    pub fn destination_timestamp(&self) -> Timestamp {
        self.destination_timestamp
    }

    pub fn callback_timestamp(&self) -> Timestamp {
        self.callback_timestamp
    }

    pub fn response_sent_timestamp(&self) -> Timestamp {
        self.response_sent_timestamp
    }

    /// Column names, in serialization order.
    pub fn csv_header() -> &'static str {
        CSV_HEADER
    }

    /// Integer nanoseconds since the Unix epoch. Unset renders as `0`.
    pub fn timestamp_to_string(timestamp: &Timestamp) -> String {
        clock::to_nanos(timestamp).to_string()
    }

    /// One CSV line (without terminator), fields in header order.
    pub fn to_csv(&self) -> String {
        [
            &self.source_timestamp,
            &self.destination_timestamp,
            &self.callback_timestamp,
            &self.response_sent_timestamp,
        ]
        .iter()
        .map(|t| Self::timestamp_to_string(t))
        .collect::<Vec<_>>()
        .join(",")
    }
}

impl fmt::Display for ServiceRequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_csv())
    }
}

/// Parses a line previously produced by [`ServiceRequestRecord::to_csv`].
impl FromStr for ServiceRequestRecord {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: String| Error::MalformedRecord {
            line: line.to_owned(),
            reason,
        };

        let fields = line
            .trim_end_matches(['\r', '\n'])
            .split(',')
            .map(|f| {
                f.trim()
                    .parse::<i64>()
                    .map(clock::from_nanos)
                    .map_err(|e| malformed(format!("field {f:?}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let [source, destination, callback, response_sent] =
            <[Timestamp; CSV_COLUMNS]>::try_from(fields).map_err(|v| {
                malformed(format!(
                    "expected {CSV_COLUMNS} fields, found {}",
                    v.len()
                ))
            })?;

        // A persisted line already satisfies the ordering invariants;
        // anything else is rejected rather than repaired.
        if callback > response_sent {
            return Err(malformed(
                "callback timestamp is after response sent timestamp".into(),
            ));
        }
        let transport = TransportTimestamps::new(
            Some(source).filter(|t| !clock::is_unset(t)),
            Some(destination).filter(|t| !clock::is_unset(t)),
        );
        if let (Some(source), Some(destination)) = (transport.source, transport.destination) {
            if source > destination {
                return Err(malformed(
                    "source timestamp is after destination timestamp".into(),
                ));
            }
        }

        Ok(Self::new(transport, callback, response_sent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::from_nanos;

    fn known_record() -> ServiceRequestRecord {
        ServiceRequestRecord::new(
            TransportTimestamps::new(
                Some(from_nanos(1_000_000)),
                Some(from_nanos(2_000_000)),
            ),
            from_nanos(3_000_000),
            from_nanos(4_000_000),
        )
    }

    #[test]
    fn header_is_constant_with_four_columns() {
        let header = ServiceRequestRecord::csv_header();
        assert_eq!(header, ServiceRequestRecord::csv_header());
        let columns: Vec<_> = header.split(',').map(str::trim).collect();
        assert_eq!(
            columns,
            [
                "source timestamp",
                "destination timestamp",
                "callback timestamp",
                "response sent timestamp",
            ]
        );
    }

    #[test]
    fn serializes_known_timestamps_comma_separated() {
        assert_eq!(known_record().to_csv(), "1000000,2000000,3000000,4000000");
        assert_eq!(known_record().to_string(), "1000000,2000000,3000000,4000000");
    }

    #[test]
    fn unset_transport_timestamps_render_as_zero() {
        let record = ServiceRequestRecord::new(
            TransportTimestamps::unset(),
            from_nanos(10),
            from_nanos(20),
        );
        assert!(clock::is_unset(&record.source_timestamp()));
        assert!(clock::is_unset(&record.destination_timestamp()));
        assert_eq!(record.to_csv(), "0,0,10,20");
        assert_eq!(
            ServiceRequestRecord::timestamp_to_string(&clock::unset()),
            "0"
        );
    }

    #[test]
    fn response_sent_never_precedes_callback() {
        let record = ServiceRequestRecord::new(
            TransportTimestamps::unset(),
            from_nanos(500),
            from_nanos(400),
        );
        assert_eq!(record.callback_timestamp(), from_nanos(500));
        assert_eq!(record.response_sent_timestamp(), from_nanos(500));
    }

    #[test]
    fn out_of_order_transport_pair_drops_source() {
        let record = ServiceRequestRecord::new(
            TransportTimestamps::new(Some(from_nanos(9)), Some(from_nanos(5))),
            from_nanos(10),
            from_nanos(11),
        );
        assert!(clock::is_unset(&record.source_timestamp()));
        assert_eq!(record.destination_timestamp(), from_nanos(5));
    }

    #[test]
    fn parses_what_it_writes() {
        let record = known_record();
        let parsed: ServiceRequestRecord = record.to_csv().parse().unwrap();
        assert_eq!(parsed, record);

        let spaced: ServiceRequestRecord =
            "0, 0, 3000000, 4000000\n".parse().unwrap();
        assert_eq!(spaced.to_csv(), "0,0,3000000,4000000");
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "",
            "1,2,3",
            "1,2,3,4,5",
            "1,x,3,4",
            "1000000200000030000004000000",
            // response sent before callback
            "0,0,500,400",
            // sent after it was received
            "9,5,10,11",
        ] {
            let err = line.parse::<ServiceRequestRecord>().unwrap_err();
            assert!(
                matches!(err, Error::MalformedRecord { .. }),
                "{line:?} -> {err}"
            );
        }
    }
}
