//! # Observability
//!
//! Centralized logging for the ProjectPulse workspace.
//!
//! Components are **log producers**. They call `observability::init()` once at
//! startup and use standard `tracing` macros everywhere else. Where the lines
//! end up is decided here:
//!
//! - Structured JSONL appended to `~/.projectpulse/logs/dev.jsonl`
//! - Optionally a compact human-readable stream on stderr
//!
//! Fields whose names look like credentials (`password`, `token`, ...) are
//! redacted before they reach any sink.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init("pulse");
//!     tracing::info!("harness started");
//! }
//! ```
//!
//! Or with configuration:
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "pulse".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! });
//! ```

mod json_layer;
mod writer;

pub use json_layer::{JsonLayer, LogEntry, REDACTED};
pub use writer::{default_log_path, CentralLogWriter, WriterFactory};

use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the component (e.g., "pulse", "android-bridge").
    /// Included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.projectpulse/logs/dev.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize the observability layer with default settings.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize the observability layer with custom configuration.
///
/// If the central log file cannot be opened, logging falls back to stderr
/// only. Calling this more than once is a no-op: the first installed
/// subscriber wins.
pub fn init_with_config(config: LogConfig) {
    let log_path = config.log_path.clone().or_else(default_log_path);

    let file_layer = match log_path.as_ref().map(CentralLogWriter::new) {
        Some(Ok(writer)) => Some(
            JsonLayer::new(config.service_name.clone(), WriterFactory::new(writer))
                .with_filter(env_filter(&config.default_level)),
        ),
        Some(Err(e)) => {
            eprintln!("observability: failed to open log file {:?}: {}", log_path, e);
            None
        }
        None => None,
    };

    // Fall back to stderr when there is no file sink at all
    let stderr_enabled = config.also_stderr || file_layer.is_none();
    let stderr_layer = stderr_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(io::stderr)
            .with_ansi(true)
            .with_filter(env_filter(&config.default_level))
    });

    let has_file = file_layer.is_some();
    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            service = %config.service_name,
            log_path = ?log_path.filter(|_| has_file),
            "observability initialized"
        );
    }
}

/// Build an env filter from `RUST_LOG`, falling back to the given level.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
