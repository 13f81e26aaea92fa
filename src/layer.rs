use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::record::LogLevel;
use crate::writer::EcsLogWriter;

/// Events emitted by this crate itself never reach the log file; writing
/// them would recurse into the layer from inside `on_event`.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");
const OWN_TARGET_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

/// Label key carrying the event target (ECS `log.logger`).
pub const LOGGER_LABEL: &str = "log.logger";

fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET || target.starts_with(OWN_TARGET_PREFIX)
}

/// `tracing_subscriber` layer that turns `tracing` events into ECS lines
/// appended through a shared [`EcsLogWriter`].
///
/// The event's `message` field becomes the record message. All other fields
/// land in `labels`, together with the event target under `log.logger`
/// unless the event already has a field of that name.
/// Writes happen synchronously on the thread that emitted the event.
///
/// Every event the layer sees is written. Level selection is left to the
/// subscriber stack, e.g. `EcsLayer::new(writer).with_filter(LevelFilter::INFO)`.
pub struct EcsLayer {
    writer: Arc<EcsLogWriter>,
    /// Events seen by the layer, excluding this crate's own diagnostics.
    pub total_events: Arc<AtomicU64>,
    /// Successfully appended to the file.
    pub written_events: Arc<AtomicU64>,
    /// Lost because the append or serialization failed.
    pub failed_events: Arc<AtomicU64>,
}

impl EcsLayer {
    pub fn new(writer: Arc<EcsLogWriter>) -> Self {
        Self {
            writer,
            total_events: Arc::new(AtomicU64::new(0)),
            written_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn writer(&self) -> &Arc<EcsLogWriter> {
        &self.writer
    }
}

impl<S> Layer<S> for EcsLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let level = LogLevel::from(*meta.level());

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        fields
            .entry(LOGGER_LABEL.to_string())
            .or_insert_with(|| serde_json::Value::from(meta.target()));

        let message = message.unwrap_or_default();
        match self.writer.log(level, &message, &fields) {
            Ok(()) => {
                self.written_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("ecs layer dropped a record: {}", e);
            }
        }
    }
}

/// Collects event fields into JSON values, splitting out `message`.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form; Value::from maps them to null.
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `info!("text")` delivers the message as fmt::Arguments through here.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn events_become_ecs_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.log");
        let layer = EcsLayer::new(Arc::new(EcsLogWriter::new(&path).unwrap()));
        let written = Arc::clone(&layer.written_events);
        let total = Arc::clone(&layer.total_events);

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!("folded into debug");
            tracing::info!(user = "jdoe", attempts = 3u64, ok = true, "login succeeded");
            tracing::error!(target: "billing", ratio = 0.5, "charge failed");
        });

        assert_eq!(total.load(Ordering::Relaxed), 3);
        assert_eq!(written.load(Ordering::Relaxed), 3);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);

        assert_eq!(lines[0]["log.level"], "debug");

        assert_eq!(lines[1]["message"], "login succeeded");
        assert_eq!(lines[1]["log.level"], "info");
        assert_eq!(lines[1]["labels"]["user"], "jdoe");
        assert_eq!(lines[1]["labels"]["attempts"], 3);
        assert_eq!(lines[1]["labels"]["ok"], true);

        assert_eq!(lines[2]["log.level"], "error");
        assert_eq!(lines[2]["labels"]["log.logger"], "billing");
        assert_eq!(lines[2]["labels"]["ratio"], 0.5);
    }

    #[test]
    fn level_filter_composes_with_layer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filtered.log");
        let layer = EcsLayer::new(Arc::new(EcsLogWriter::new(&path).unwrap()));

        let subscriber = Registry::default().with(layer.with_filter(LevelFilter::WARN));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("skipped");
            tracing::warn!("kept");
        });

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "kept");
    }

    #[test]
    fn caller_target_field_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fields.log");
        let layer = EcsLayer::new(Arc::new(EcsLogWriter::new(&path).unwrap()));

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "svc", { target = "user-supplied" }, "b");
        });

        let lines = read_lines(&path);
        assert_eq!(lines[0]["labels"]["target"], "user-supplied");
        assert_eq!(lines[0]["labels"]["log.logger"], "svc");
    }

    #[test]
    fn own_diagnostics_are_skipped_but_similar_targets_are_not() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("own.log");
        let layer = EcsLayer::new(Arc::new(EcsLogWriter::new(&path).unwrap()));
        let total = Arc::clone(&layer.total_events);

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "ecs_log_writer", "internal");
            tracing::warn!(target: "ecs_log_writer::writer", "internal");
            tracing::info!(target: "ecs_log_writer_app", "from a downstream crate");
        });

        assert_eq!(total.load(Ordering::Relaxed), 1);
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "from a downstream crate");
        assert_eq!(lines[0]["labels"]["log.logger"], "ecs_log_writer_app");
    }

    #[test]
    fn failed_appends_are_counted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.log");
        let layer = EcsLayer::new(Arc::new(EcsLogWriter::new(&path).unwrap()));
        let written = Arc::clone(&layer.written_events);
        let failed = Arc::clone(&layer.failed_events);
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("cannot be written");
        });

        assert_eq!(written.load(Ordering::Relaxed), 0);
        assert_eq!(failed.load(Ordering::Relaxed), 1);
    }
}
