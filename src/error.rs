use std::io;
use std::path::PathBuf;

/// Error type returned by [`EcsLogWriter`](crate::writer::EcsLogWriter).
///
/// Every variant is reported once to the caller; the writer never retries.
#[derive(thiserror::Error, Debug)]
pub enum WriterError {
    #[error("failed to create log file {path:?}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {path:?} for appending: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to log file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[cfg(feature = "tokio")]
    #[error("blocking append task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Error returned when parsing an unknown [`LogLevel`](crate::record::LogLevel) name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);
