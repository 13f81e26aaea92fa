use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ParseLevelError, WriterError};

/// ECS schema version stamped on every record.
pub const ECS_VERSION: &str = "1.12.2";

/// Severity of a log record. Serializes to its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// ECS has no `trace`, so it folds into `debug`.
impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => LogLevel::Error,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::INFO => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

/// Labels payload for records that carry no context. Serializes to `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoLabels {}

/// One ECS-shaped log line.
///
/// Built fresh for every write and dropped right after serialization, so it
/// only borrows the caller's message and labels.
#[derive(Debug, Serialize)]
pub struct EcsRecord<'a, L: Serialize + ?Sized> {
    pub message: &'a str,
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    #[serde(rename = "log.level")]
    pub log_level: LogLevel,
    #[serde(rename = "ecs.version")]
    pub ecs_version: &'static str,
    pub labels: &'a L,
}

impl<'a, L: Serialize + ?Sized> EcsRecord<'a, L> {
    pub fn new(level: LogLevel, message: &'a str, labels: &'a L, timestamp: String) -> Self {
        Self {
            message,
            timestamp,
            log_level: level,
            ecs_version: ECS_VERSION,
            labels,
        }
    }
}

/// Format `at` as an internet date-time with second precision and a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current UTC time, e.g. `2023-11-01T12:34:56Z`.
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

/// Serialize a record stamped with the current time into a single
/// newline-terminated JSON line.
pub fn encode_line<L: Serialize + ?Sized>(
    level: LogLevel,
    message: &str,
    labels: &L,
) -> Result<String, WriterError> {
    encode_line_at(level, message, labels, Utc::now())
}

/// Same as [`encode_line`] with an explicit timestamp.
pub fn encode_line_at<L: Serialize + ?Sized>(
    level: LogLevel,
    message: &str,
    labels: &L,
    at: DateTime<Utc>,
) -> Result<String, WriterError> {
    let record = EcsRecord::new(level, message, labels, format_timestamp(at));
    // serde_json's compact writer escapes control characters inside strings,
    // so the output never contains a raw newline.
    let mut line = serde_json::to_string(&record)?;
    line.push('\n');
    Ok(line)
}
