//! Session state machine using rust-fsm.
//!
//! Every phase accepts every input, so no command or identity notification
//! can ever be refused. The target phase depends only on the input:
//!
//! ```text
//!                    RequestStarted
//!   (any phase) ───────────────────────► Authenticating
//!
//!   IdentityObserved / CredentialsAccepted
//!   (any phase) ───────────────────────► Authenticated
//!
//!                    RequestFailed
//!   (any phase) ───────────────────────► Failed
//!
//!              ResetIssued / SignedOut
//!   (any phase) ───────────────────────► Unauthenticated (initial)
//! ```
//!
//! The phase carries no payload; `SessionEvent` pairs an input with the
//! identity or message that `SessionState` needs.

use crate::SessionState;
use identity_backend::Identity;
use rust_fsm::*;

state_machine! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub session_machine(Unauthenticated)

    Unauthenticated => {
        IdentityObserved => Authenticated,
        RequestStarted => Authenticating,
        CredentialsAccepted => Authenticated,
        ResetIssued => Unauthenticated,
        RequestFailed => Failed,
        SignedOut => Unauthenticated
    },
    Authenticating => {
        IdentityObserved => Authenticated,
        RequestStarted => Authenticating,
        CredentialsAccepted => Authenticated,
        ResetIssued => Unauthenticated,
        RequestFailed => Failed,
        SignedOut => Unauthenticated
    },
    Authenticated => {
        IdentityObserved => Authenticated,
        RequestStarted => Authenticating,
        CredentialsAccepted => Authenticated,
        ResetIssued => Unauthenticated,
        RequestFailed => Failed,
        SignedOut => Unauthenticated
    },
    Failed => {
        IdentityObserved => Authenticated,
        RequestStarted => Authenticating,
        CredentialsAccepted => Authenticated,
        ResetIssued => Unauthenticated,
        RequestFailed => Failed,
        SignedOut => Unauthenticated
    }
}

pub use session_machine::Input as SessionInput;
pub use session_machine::State as SessionPhase;
pub use session_machine::StateMachine as SessionMachine;

/// An FSM input together with the data the resulting state carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    /// The backend reported an active session.
    IdentityObserved(Identity),
    /// sign-in, sign-up or reset-password began.
    RequestStarted,
    /// sign-in or sign-up succeeded.
    CredentialsAccepted(Identity),
    /// reset-password succeeded.
    ResetIssued,
    /// A backend call failed; carries the user-facing message.
    RequestFailed(String),
    /// sign-out completed.
    SignedOut,
}

impl SessionEvent {
    pub(crate) fn input(&self) -> SessionInput {
        match self {
            SessionEvent::IdentityObserved(_) => SessionInput::IdentityObserved,
            SessionEvent::RequestStarted => SessionInput::RequestStarted,
            SessionEvent::CredentialsAccepted(_) => SessionInput::CredentialsAccepted,
            SessionEvent::ResetIssued => SessionInput::ResetIssued,
            SessionEvent::RequestFailed(_) => SessionInput::RequestFailed,
            SessionEvent::SignedOut => SessionInput::SignedOut,
        }
    }

    /// Build the state for `phase` from this event's payload.
    ///
    /// Returns `None` when the phase needs a payload this event lacks.
    pub(crate) fn settle(self, phase: SessionPhase) -> Option<SessionState> {
        match (phase, self) {
            (SessionPhase::Unauthenticated, _) => Some(SessionState::Unauthenticated),
            (SessionPhase::Authenticating, _) => Some(SessionState::Authenticating),
            (
                SessionPhase::Authenticated,
                SessionEvent::IdentityObserved(identity) | SessionEvent::CredentialsAccepted(identity),
            ) => Some(SessionState::Authenticated(identity)),
            (SessionPhase::Failed, SessionEvent::RequestFailed(message)) => {
                Some(SessionState::Failed(message))
            }
            _ => None,
        }
    }
}
