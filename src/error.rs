use std::io;
use std::path::PathBuf;

/// Errors surfaced by the instrumentation core.
///
/// None of these ever reach a request caller: capture is best-effort and
/// persistence only runs at shutdown.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot create output file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write to {path} failed after {lines_written} lines: {source}")]
    Write {
        path: PathBuf,
        lines_written: usize,
        #[source]
        source: io::Error,
    },

    #[error("service instance already shut down")]
    AlreadyShutDown,

    #[error("malformed record line {line:?}: {reason}")]
    MalformedRecord { line: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
