//! Shutdown-time persistence of the record log.
//!
//! The whole store is written in one pass to
//! `records__<name>__<YYYY.MM.DD-HH:MM:SS>.csv`: the header line, then one
//! line per record in arrival order. A successful write ends with an `info`
//! line naming the record count; anything less is logged as an error and
//! whatever was written before the failure stays on disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};

use super::ServiceRequestRecord;
use crate::error::{Error, Result};

const FILE_PREFIX: &str = "records__";
const FILE_SEPARATOR: &str = "__";
const FILE_EXTENSION: &str = ".csv";
const START_TIME_FORMAT: &str = "%Y.%m.%d-%H:%M:%S";

/// Outcome of a complete write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub records: usize,
}

/// Replace path separators so the instance name stays a single path component.
pub fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Start time in local time, e.g. `2024.03.07-14:05:09`.
pub fn format_start_time(start_time: &DateTime<Utc>) -> String {
    start_time
        .with_timezone(&Local)
        .format(START_TIME_FORMAT)
        .to_string()
}

pub fn output_file_name(name: &str, start_time: &DateTime<Utc>) -> String {
    format!(
        "{FILE_PREFIX}{}{FILE_SEPARATOR}{}{FILE_EXTENSION}",
        sanitize_name(name),
        format_start_time(start_time),
    )
}

/// Write `records` into `dir`. The file handle is flushed, synced and closed
/// before this returns, on success and on failure alike.
pub fn write_records(
    dir: &Path,
    name: &str,
    start_time: &DateTime<Utc>,
    records: &[ServiceRequestRecord],
) -> Result<WriteReport> {
    let path = dir.join(output_file_name(name, start_time));
    tracing::info!(path = %path.display(), records = records.len(), "writing output file");

    let file = File::create(&path).map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "cannot create output file");
        Error::Create {
            path: path.clone(),
            source,
        }
    })?;

    let mut lines_written = 0;
    let result = write_lines(file, records, &mut lines_written);

    match result {
        Ok(()) => {
            tracing::info!(
                path = %path.display(),
                records = records.len(),
                "wrote {} records, output complete",
                records.len()
            );
            Ok(WriteReport {
                path,
                records: records.len(),
            })
        }
        Err(source) => {
            tracing::error!(
                path = %path.display(),
                lines_written,
                error = %source,
                "output file is incomplete"
            );
            Err(Error::Write {
                path,
                lines_written,
                source,
            })
        }
    }
}

/// Emits header and records. `lines_written` counts only lines the sink
/// has accepted in full, never lines still sitting in the buffer.
fn write_lines<W: Write + SyncAll>(
    sink: W,
    records: &[ServiceRequestRecord],
    lines_written: &mut usize,
) -> std::io::Result<()> {
    let mut out = BufWriter::new(LineCounter {
        inner: sink,
        lines: lines_written,
    });

    writeln!(out, "{}", ServiceRequestRecord::csv_header())?;
    for record in records {
        writeln!(out, "{}", record.to_csv())?;
    }

    out.flush()?;
    let counter = out.into_inner().map_err(|e| e.into_error())?;
    counter.inner.sync_all()
}

/// Counts the line terminators the wrapped sink has accepted.
struct LineCounter<'a, W> {
    inner: W,
    lines: &'a mut usize,
}

impl<W: Write> Write for LineCounter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        *self.lines += buf[..n].iter().filter(|&&b| b == b'\n').count();
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Durability hook for the underlying sink.
trait SyncAll {
    fn sync_all(&self) -> std::io::Result<()>;
}

impl SyncAll for File {
    fn sync_all(&self) -> std::io::Result<()> {
        File::sync_all(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::from_nanos;
    use crate::metrics::TransportTimestamps;
    use chrono::TimeZone;
    use std::io;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap()
    }

    fn record(n: i64) -> ServiceRequestRecord {
        ServiceRequestRecord::new(
            TransportTimestamps::unset(),
            from_nanos(n),
            from_nanos(n + 5),
        )
    }

    #[test]
    fn sanitizes_path_separators() {
        assert_eq!(sanitize_name("/ns/node"), "_ns_node");
        assert_eq!(sanitize_name("a\\b"), "a_b");
        assert_eq!(sanitize_name("plain"), "plain");
    }

    #[test]
    fn file_name_layout() {
        let name = output_file_name("/instrumented_service_node", &start());
        let local = format_start_time(&start());
        assert_eq!(
            name,
            format!("records___instrumented_service_node__{local}.csv")
        );
        // YYYY.MM.DD-HH:MM:SS
        assert_eq!(local.len(), 19);
        assert_eq!(&local[4..5], ".");
        assert_eq!(&local[10..11], "-");
        assert_eq!(&local[13..14], ":");
    }

    #[test]
    fn file_names_differ_by_name_and_start_time() {
        let t = start();
        let later = t + chrono::Duration::seconds(1);
        assert_ne!(output_file_name("/a", &t), output_file_name("/b", &t));
        assert_ne!(output_file_name("/a", &t), output_file_name("/a", &later));
        assert!(!output_file_name("/x/y/z", &t)[FILE_PREFIX.len()..].contains('/'));
    }

    #[test]
    fn writes_header_then_records() {
        let dir = tempfile::tempdir().unwrap();
        let report =
            write_records(dir.path(), "/node", &start(), &[record(1), record(2)])
                .unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(report.path.parent(), Some(dir.path()));
        let contents = std::fs::read_to_string(&report.path).unwrap();
        assert_eq!(
            contents,
            format!(
                "{}\n0,0,1,6\n0,0,2,7\n",
                ServiceRequestRecord::csv_header()
            )
        );
    }

    #[test]
    fn empty_store_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let report = write_records(dir.path(), "n", &start(), &[]).unwrap();
        let contents = std::fs::read_to_string(&report.path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn missing_directory_is_a_create_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = write_records(&missing, "n", &start(), &[record(1)]).unwrap_err();
        assert!(matches!(err, Error::Create { .. }), "{err}");
    }

    /// Accepts up to `limit` bytes (splitting a write if needed), then
    /// fails every write.
    struct FailingSink {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.written.len();
            if room == 0 {
                return Err(io::Error::other("disk full"));
            }
            let n = buf.len().min(room);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SyncAll for &mut FailingSink {
        fn sync_all(&self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn mid_write_failure_counts_only_lines_on_the_sink() {
        let records: Vec<_> = (0..10_000).map(record).collect();
        // Not a multiple of the buffer size, so the last line is cut short
        let mut sink = FailingSink {
            written: Vec::new(),
            limit: 64 * 1024 + 7,
        };
        let mut lines = 0;
        let err = write_lines(&mut sink, &records, &mut lines).unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        let on_sink = sink.written.iter().filter(|&&b| b == b'\n').count();
        assert_eq!(lines, on_sink);
        assert!(lines > 0 && lines < records.len() + 1);
    }

    #[test]
    fn complete_write_counts_every_line() {
        let records: Vec<_> = (0..100).map(record).collect();
        let mut sink = FailingSink {
            written: Vec::new(),
            limit: usize::MAX,
        };
        let mut lines = 0;
        write_lines(&mut sink, &records, &mut lines).unwrap();
        assert_eq!(lines, records.len() + 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn full_device_is_a_write_error() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(output_file_name("n", &start()));
        std::os::unix::fs::symlink(full, &target).unwrap();

        let records: Vec<_> = (0..1_000).map(record).collect();
        let err = write_records(dir.path(), "n", &start(), &records).unwrap_err();
        match err {
            Error::Write {
                path,
                lines_written,
                ..
            } => {
                assert_eq!(path, target);
                assert_eq!(lines_written, 0);
            }
            other => panic!("expected a write error, got {other}"),
        }
    }
}
