//! Environment variable names used by this crate for convenient
//! configuration from services.
//!
//! These are purely helpers; the writer itself never reads the environment.

/// Target log file path.
pub const ECS_LOG_PATH_ENV: &str = "ECS_LOG_PATH";

/// `true`/`1` to also print events to the console.
pub const ECS_LOG_STDOUT_ENV: &str = "ECS_LOG_STDOUT";

/// Default file used when [`ECS_LOG_PATH_ENV`] is unset.
pub const DEFAULT_LOG_PATH: &str = "ecs.log";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Interpret common boolean spellings; `None` for anything else.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
