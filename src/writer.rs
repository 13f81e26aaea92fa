use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::WriterError;
use crate::record::{encode_line, LogLevel, NoLabels};

/// Construction options for [`EcsLogWriter`].
///
/// **Fields**
/// - `path`: target log file.
/// - `create_dirs`: create missing parent directories before touching the
///   file. Off by default; the parent is expected to exist.
#[derive(Clone, Debug)]
pub struct WriterConfig {
    pub path: PathBuf,
    pub create_dirs: bool,
}

impl WriterConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_dirs: false,
        }
    }

    pub fn create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

/// Appends ECS JSON lines to a file.
///
/// The writer stores only the path. Every [`log`](Self::log) call opens the
/// file in append mode, writes one complete line with a single `write_all`,
/// and closes it again, so no descriptor is held between calls.
///
/// Calls on the same writer are serialized by an internal mutex, which keeps
/// lines intact for any number of threads in one process. Separate writers
/// or separate processes targeting the same file rely on the platform's
/// `O_APPEND` atomicity, which generally only holds for small writes.
#[derive(Debug)]
pub struct EcsLogWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl EcsLogWriter {
    /// Create a writer for `path`, creating an empty file if none exists.
    ///
    /// An existing file is left untouched.
    ///
    /// **Returns**
    /// - `Err(WriterError::Create)` if the file could not be created, e.g.
    ///   the parent directory is missing or not writable.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, WriterError> {
        Self::with_config(WriterConfig::new(path))
    }

    /// Create a writer from a [`WriterConfig`].
    pub fn with_config(config: WriterConfig) -> Result<Self, WriterError> {
        let path = config.path;

        if config.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| WriterError::Create {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| WriterError::Create {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "ecs log writer ready");
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Target file of this writer.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record with the given labels.
    ///
    /// The record is serialized before the file is opened, so a
    /// serialization failure leaves the file untouched.
    ///
    /// **Returns**
    /// - `Err(WriterError::Serialize)` if `labels` cannot be represented as JSON.
    /// - `Err(WriterError::Open)` / `Err(WriterError::Write)` on I/O failure.
    pub fn log<L>(&self, level: LogLevel, message: &str, labels: &L) -> Result<(), WriterError>
    where
        L: Serialize + ?Sized,
    {
        let line = encode_line(level, message, labels)?;
        self.append_line(&line)
    }

    /// Append one record whose `labels` is an empty object.
    pub fn log_message(&self, level: LogLevel, message: &str) -> Result<(), WriterError> {
        self.log(level, message, &NoLabels {})
    }

    pub fn debug<L: Serialize + ?Sized>(&self, message: &str, labels: &L) -> Result<(), WriterError> {
        self.log(LogLevel::Debug, message, labels)
    }

    pub fn info<L: Serialize + ?Sized>(&self, message: &str, labels: &L) -> Result<(), WriterError> {
        self.log(LogLevel::Info, message, labels)
    }

    pub fn warn<L: Serialize + ?Sized>(&self, message: &str, labels: &L) -> Result<(), WriterError> {
        self.log(LogLevel::Warn, message, labels)
    }

    pub fn error<L: Serialize + ?Sized>(&self, message: &str, labels: &L) -> Result<(), WriterError> {
        self.log(LogLevel::Error, message, labels)
    }

    /// Append an already encoded, newline-terminated line.
    pub(crate) fn append_line(&self, line: &str) -> Result<(), WriterError> {
        // The mutex guards no data, so a poisoned lock is still usable.
        let guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| WriterError::Open {
                path: self.path.clone(),
                source,
            })?;

        let result = file
            .write_all(line.as_bytes())
            .map_err(|source| WriterError::Write {
                path: self.path.clone(),
                source,
            });
        drop(file);
        drop(guard);

        if let Err(e) = &result {
            warn!(path = %self.path.display(), error = %e, "failed to append ecs record");
        }
        result
    }
}
