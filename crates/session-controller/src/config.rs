//! Controller tuning.

use pulse_config_and_utils::{
    Config, DEFAULT_RESUBSCRIBE_INITIAL_DELAY_MS, DEFAULT_RESUBSCRIBE_MAX_DELAY_MS,
    DEFAULT_STATE_CHANNEL_CAPACITY,
};
use std::time::Duration;

/// Backoff applied when the backend's identity stream ends and the watcher
/// has to subscribe again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResubscribeConfig {
    /// Delay before the first re-subscribe in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between re-subscribes in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ResubscribeConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: DEFAULT_RESUBSCRIBE_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_RESUBSCRIBE_MAX_DELAY_MS,
        }
    }
}

impl ResubscribeConfig {
    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .initial_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}

/// Configuration for a `SessionController`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Upper bound for one backend call. `None` waits indefinitely.
    pub backend_timeout: Option<Duration>,
    /// Transitions buffered per observer before it lags and re-syncs.
    pub state_channel_capacity: usize,
    /// Identity stream re-subscribe backoff.
    pub resubscribe: ResubscribeConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            backend_timeout: None,
            state_channel_capacity: DEFAULT_STATE_CHANNEL_CAPACITY,
            resubscribe: ResubscribeConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = Some(timeout);
        self
    }
}

impl From<&Config> for ControllerConfig {
    fn from(config: &Config) -> Self {
        Self {
            backend_timeout: config.backend_timeout(),
            state_channel_capacity: config.state_channel_capacity.max(1),
            resubscribe: ResubscribeConfig {
                initial_delay_ms: config.resubscribe_initial_delay_ms,
                max_delay_ms: config.resubscribe_max_delay_ms,
            },
        }
    }
}
