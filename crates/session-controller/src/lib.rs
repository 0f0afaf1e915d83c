//! Authentication session core for ProjectPulse.
//!
//! This crate provides:
//! - `SessionState`, the client-visible authentication status
//! - An explicit FSM (`session_machine`) defining every transition
//! - `SessionController`, which sequences identity backend calls and
//!   publishes state to any number of observers
//! - Form readiness helpers mirroring the sign-in and sign-up screens

mod config;
mod controller;
mod error;
pub mod forms;
mod fsm;
mod state;
mod store;
mod subscription;

pub use config::{ControllerConfig, ResubscribeConfig};
pub use controller::{SessionController, PASSWORD_RESET_FALLBACK, SIGN_IN_FALLBACK, SIGN_UP_FALLBACK};
pub use error::{SessionError, SessionResult};
pub use fsm::session_machine;
pub use fsm::{SessionInput, SessionMachine, SessionPhase};
pub use state::SessionState;
pub use subscription::StateSubscription;

pub use identity_backend::{BackendError, Destination, Identity, IdentityBackend, Role};
