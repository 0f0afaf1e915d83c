//! Client-visible authentication state.

use crate::SessionPhase;
use identity_backend::{Destination, Identity};
use serde::{Deserialize, Serialize};

/// The controller's current authentication status.
///
/// Exactly one value exists per controller at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SessionState {
    /// No session (initial).
    Unauthenticated,
    /// A sign-in, sign-up or reset request is in flight.
    Authenticating,
    /// Session established for this identity.
    Authenticated(Identity),
    /// The last request failed; the message is human-readable and non-empty.
    Failed(String),
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Unauthenticated
    }
}

impl SessionState {
    /// The payload-free FSM phase of this state.
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Unauthenticated => SessionPhase::Unauthenticated,
            SessionState::Authenticating => SessionPhase::Authenticating,
            SessionState::Authenticated(_) => SessionPhase::Authenticated,
            SessionState::Failed(_) => SessionPhase::Failed,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Returns true while a backend request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SessionState::Authenticating)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            SessionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Where the UI should land, for authenticated states only.
    pub fn destination(&self) -> Option<Destination> {
        self.identity().map(Identity::destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use identity_backend::Role;

    fn pm() -> Identity {
        Identity::new("u7", "pm@b.com", "Pat", Role::ProjectManager)
    }

    #[test]
    fn test_default_is_unauthenticated() {
        assert_eq!(SessionState::default(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_phase_mapping() {
        assert_eq!(
            SessionState::Unauthenticated.phase(),
            SessionPhase::Unauthenticated
        );
        assert_eq!(
            SessionState::Authenticating.phase(),
            SessionPhase::Authenticating
        );
        assert_eq!(
            SessionState::Authenticated(pm()).phase(),
            SessionPhase::Authenticated
        );
        assert_eq!(
            SessionState::Failed("x".to_string()).phase(),
            SessionPhase::Failed
        );
    }

    #[test]
    fn test_accessors() {
        let state = SessionState::Authenticated(pm());
        assert!(state.is_authenticated());
        assert!(!state.is_in_flight());
        assert_eq!(state.identity().map(|i| i.id.as_str()), Some("u7"));
        assert_eq!(state.destination(), Some(Destination::ProjectManagerDashboard));
        assert!(state.failure_message().is_none());

        let state = SessionState::Failed("WeakPassword: too short".to_string());
        assert_eq!(state.failure_message(), Some("WeakPassword: too short"));
        assert!(state.destination().is_none());

        assert!(SessionState::Authenticating.is_in_flight());
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(SessionState::Unauthenticated).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "unauthenticated" }));

        let json = serde_json::to_value(SessionState::Failed("NetworkError: offline".into())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "state": "failed", "detail": "NetworkError: offline" })
        );

        let json = serde_json::to_value(SessionState::Authenticated(pm())).unwrap();
        assert_eq!(json["state"], "authenticated");
        assert_eq!(json["detail"]["role"], "project_manager");

        let back: SessionState = serde_json::from_value(json).unwrap();
        assert_eq!(back, SessionState::Authenticated(pm()));
    }
}
