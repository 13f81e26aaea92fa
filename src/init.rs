use crate::env::{env_or, parse_flag, DEFAULT_LOG_PATH, ECS_LOG_PATH_ENV, ECS_LOG_STDOUT_ENV};
use crate::error::WriterError;
use crate::layer::EcsLayer;
use crate::writer::EcsLogWriter;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the `tracing` bridge.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top of [`EcsLayer`] and events are printed to the console.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

impl LayerConfig {
    /// Build a config from `ECS_LOG_STDOUT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let enable_stdout = lookup(ECS_LOG_STDOUT_ENV)
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.enable_stdout);
        Self { enable_stdout }
    }
}

/// Error returned by [`init_from_env`].
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error(transparent)]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Install a global `tracing` subscriber that writes events through
/// `writer`.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already set.
pub fn init_tracing_with_config(
    writer: Arc<EcsLogWriter>,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = EcsLayer::new(writer);

    // Two branches because the stacked subscriber types differ.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`].
pub fn init_tracing(writer: Arc<EcsLogWriter>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(writer, LayerConfig::default())
}

/// Open the file named by `ECS_LOG_PATH` (default `ecs.log`) and install the
/// bridge configured from the environment.
pub fn init_from_env() -> Result<Arc<EcsLogWriter>, InitError> {
    let path = env_or(ECS_LOG_PATH_ENV, DEFAULT_LOG_PATH);
    let writer = Arc::new(EcsLogWriter::new(path)?);
    init_tracing_with_config(Arc::clone(&writer), LayerConfig::from_env())?;
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn stdout_flag_is_read() {
        let config = LayerConfig::from_lookup(lookup_from(&[(ECS_LOG_STDOUT_ENV, "yes")]));
        assert!(config.enable_stdout);

        let config = LayerConfig::from_lookup(lookup_from(&[(ECS_LOG_STDOUT_ENV, "0")]));
        assert!(!config.enable_stdout);
    }

    #[test]
    fn unset_or_unparsable_values_keep_defaults() {
        assert_eq!(LayerConfig::from_lookup(lookup_from(&[])), LayerConfig::default());
        assert_eq!(
            LayerConfig::from_lookup(lookup_from(&[(ECS_LOG_STDOUT_ENV, "sometimes")])),
            LayerConfig::default()
        );
    }
}
