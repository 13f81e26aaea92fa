//! Append-only writer of Elastic Common Schema (ECS) log lines.
//!
//! Each call to [`EcsLogWriter::log`] appends one JSON object with the keys
//! `message`, `@timestamp`, `log.level`, `ecs.version` and `labels`, where
//! `labels` is any caller-chosen [`serde::Serialize`] type.

pub mod error;
pub mod record;
pub mod writer;
pub mod layer;

#[cfg(feature = "tokio")]
pub mod async_writer;

pub mod env;
pub mod init;

pub use error::{ParseLevelError, WriterError};
pub use record::{EcsRecord, LogLevel, NoLabels, ECS_VERSION};
pub use writer::{EcsLogWriter, WriterConfig};
