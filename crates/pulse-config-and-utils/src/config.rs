//! Configuration management.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default number of buffered state transitions per subscriber.
pub const DEFAULT_STATE_CHANNEL_CAPACITY: usize = 64;

/// Default first delay before re-subscribing to a finished identity stream.
pub const DEFAULT_RESUBSCRIBE_INITIAL_DELAY_MS: u64 = 500;

/// Default cap on the identity stream re-subscribe delay.
pub const DEFAULT_RESUBSCRIBE_MAX_DELAY_MS: u64 = 30_000;

const ENV_LOG_LEVEL: &str = "PULSE_LOG_LEVEL";
const ENV_BACKEND_TIMEOUT_MS: &str = "PULSE_BACKEND_TIMEOUT_MS";

/// Session core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Upper bound for a single identity backend call. `None` waits forever.
    #[serde(default)]
    pub backend_timeout_ms: Option<u64>,
    /// Buffered transitions per state subscriber before it lags.
    #[serde(default = "default_state_channel_capacity")]
    pub state_channel_capacity: usize,
    /// First delay before re-subscribing to a finished identity stream.
    #[serde(default = "default_resubscribe_initial_delay_ms")]
    pub resubscribe_initial_delay_ms: u64,
    /// Cap on the re-subscribe delay.
    #[serde(default = "default_resubscribe_max_delay_ms")]
    pub resubscribe_max_delay_ms: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_state_channel_capacity() -> usize {
    DEFAULT_STATE_CHANNEL_CAPACITY
}

fn default_resubscribe_initial_delay_ms() -> u64 {
    DEFAULT_RESUBSCRIBE_INITIAL_DELAY_MS
}

fn default_resubscribe_max_delay_ms() -> u64 {
    DEFAULT_RESUBSCRIBE_MAX_DELAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            backend_timeout_ms: None,
            state_channel_capacity: DEFAULT_STATE_CHANNEL_CAPACITY,
            resubscribe_initial_delay_ms: DEFAULT_RESUBSCRIBE_INITIAL_DELAY_MS,
            resubscribe_max_delay_ms: DEFAULT_RESUBSCRIBE_MAX_DELAY_MS,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    ///
    /// Malformed environment values are logged and ignored.
    pub fn new() -> Self {
        let mut config = Self::default();
        if let Err(e) = config.apply_env(env_lookup) {
            warn!(error = %e, "Ignoring malformed environment override");
        }
        config
    }

    /// Load configuration from the config file if present, falling back to
    /// defaults, then apply environment overrides and validate.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env(env_lookup)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override fields from environment-style lookups.
    ///
    /// `PULSE_BACKEND_TIMEOUT_MS` set to `0` or an empty string clears the timeout.
    pub fn apply_env<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_BACKEND_TIMEOUT_MS) {
            let raw = raw.trim();
            self.backend_timeout_ms = if raw.is_empty() {
                None
            } else {
                let ms = raw.parse::<u64>().map_err(|_| {
                    CoreError::Config(format!("{} must be a number, got {:?}", ENV_BACKEND_TIMEOUT_MS, raw))
                })?;
                (ms > 0).then_some(ms)
            };
        }

        Ok(())
    }

    /// Reject values the session controller cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.state_channel_capacity == 0 {
            return Err(CoreError::Config(
                "state_channel_capacity must be greater than zero".to_string(),
            ));
        }
        if self.resubscribe_initial_delay_ms > self.resubscribe_max_delay_ms {
            return Err(CoreError::Config(format!(
                "resubscribe_initial_delay_ms ({}) exceeds resubscribe_max_delay_ms ({})",
                self.resubscribe_initial_delay_ms, self.resubscribe_max_delay_ms
            )));
        }
        Ok(())
    }

    /// Backend call timeout as a duration.
    pub fn backend_timeout(&self) -> Option<Duration> {
        self.backend_timeout_ms.map(Duration::from_millis)
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
