//! Core configuration, file system paths and logging bootstrap shared by
//! ProjectPulse components.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_LOG_LEVEL, DEFAULT_RESUBSCRIBE_INITIAL_DELAY_MS,
    DEFAULT_RESUBSCRIBE_MAX_DELAY_MS, DEFAULT_STATE_CHANNEL_CAPACITY,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_logging_for_service, parse_level};
pub use paths::Paths;
