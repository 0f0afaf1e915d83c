//! Identity backend error types.

use thiserror::Error;

/// Failure reported by an identity backend.
///
/// The `Display` form is the human-readable message shown to users: the kind
/// name followed by the backend's detail. `Unknown` passes its detail through
/// verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Wrong email/password pair
    #[error("InvalidCredentials: {0}")]
    InvalidCredentials(String),

    /// Registration with an email that already has an account
    #[error("EmailAlreadyInUse: {0}")]
    EmailAlreadyInUse(String),

    /// Registration password rejected by the backend's policy
    #[error("WeakPassword: {0}")]
    WeakPassword(String),

    /// Password reset requested for an email with no account
    #[error("UnknownAccount: {0}")]
    UnknownAccount(String),

    /// Transport or backend unavailability
    #[error("NetworkError: {0}")]
    Network(String),

    /// Anything else
    #[error("{0}")]
    Unknown(String),
}

impl BackendError {
    /// Stable kind name, used as the message prefix and as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::InvalidCredentials(_) => "InvalidCredentials",
            BackendError::EmailAlreadyInUse(_) => "EmailAlreadyInUse",
            BackendError::WeakPassword(_) => "WeakPassword",
            BackendError::UnknownAccount(_) => "UnknownAccount",
            BackendError::Network(_) => "NetworkError",
            BackendError::Unknown(_) => "Unknown",
        }
    }

    /// The backend-supplied detail without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            BackendError::InvalidCredentials(d)
            | BackendError::EmailAlreadyInUse(d)
            | BackendError::WeakPassword(d)
            | BackendError::UnknownAccount(d)
            | BackendError::Network(d)
            | BackendError::Unknown(d) => d,
        }
    }

    /// Human-readable message that is never empty.
    ///
    /// A blank detail is replaced with `fallback` (e.g. "Sign in failed").
    pub fn user_message(&self, fallback: &str) -> String {
        let detail = self.detail().trim();
        let detail = if detail.is_empty() { fallback } else { detail };
        match self {
            BackendError::Unknown(_) => detail.to_string(),
            _ => format!("{}: {}", self.kind(), detail),
        }
    }

    /// Returns true if the operation may succeed when retried unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Network(_))
    }
}

/// Result type alias using BackendError.
pub type BackendResult<T> = Result<T, BackendError>;
