use serde::Serialize;
use std::sync::Arc;

use crate::error::WriterError;
use crate::record::{encode_line, LogLevel, NoLabels};
use crate::writer::EcsLogWriter;

/// Async front for [`EcsLogWriter`] for use inside a Tokio runtime.
///
/// Records are encoded on the calling task, then the blocking
/// open-write-close sequence runs on Tokio's blocking pool. Ordering and
/// line integrity are the same as for the wrapped writer.
#[derive(Clone, Debug)]
pub struct AsyncEcsLogWriter {
    inner: Arc<EcsLogWriter>,
}

impl AsyncEcsLogWriter {
    pub fn new(inner: Arc<EcsLogWriter>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<EcsLogWriter> {
        &self.inner
    }

    pub async fn log<L>(&self, level: LogLevel, message: &str, labels: &L) -> Result<(), WriterError>
    where
        L: Serialize + ?Sized,
    {
        let line = encode_line(level, message, labels)?;
        let writer = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || writer.append_line(&line)).await?
    }

    pub async fn log_message(&self, level: LogLevel, message: &str) -> Result<(), WriterError> {
        self.log(level, message, &NoLabels {}).await
    }
}
