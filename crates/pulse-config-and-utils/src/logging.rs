//! Logging initialization.
//!
//! Thin wrapper over the observability crate so every ProjectPulse component
//! writes to the same central JSONL stream.

use crate::Paths;
use observability::LogConfig;

/// Initialize logging for the default `pulse` service.
///
/// - Structured JSONL output to `~/.projectpulse/logs/dev.jsonl`
/// - Log level from `RUST_LOG` or the provided default
/// - Compact stderr output for foreground use
pub fn init_logging(level: &str) {
    init_logging_for_service("pulse", level, None);
}

/// Initialize logging with a custom service name and optional base directory.
///
/// When `paths` is given, logs go to `<base>/logs/dev.jsonl` instead of the
/// home directory default.
pub fn init_logging_for_service(service_name: &str, level: &str, paths: Option<&Paths>) {
    observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(level).as_str().to_ascii_lowercase(),
        log_path: paths.map(Paths::log_file),
        also_stderr: true,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
