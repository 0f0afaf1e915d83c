//! Session controller error types.

use thiserror::Error;

/// Session controller error type.
///
/// Backend failures never appear here: they become `SessionState::Failed`.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// Controller constructed outside a Tokio runtime
    #[error("SessionController must be created inside a Tokio runtime")]
    NoRuntime,
}

/// Result type alias using SessionError.
pub type SessionResult<T> = Result<T, SessionError>;
