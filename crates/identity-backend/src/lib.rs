//! Identity model and backend capability for ProjectPulse.
//!
//! This crate provides:
//! - `Identity`, `Role` and post-authentication `Destination` routing
//! - The `IdentityBackend` capability the session controller consumes
//! - `BackendError`, the failure taxonomy surfaced to users
//! - `InMemoryIdentityBackend`, a process-local backend for tests and tooling

mod backend;
mod error;
mod memory;
mod model;

pub use backend::{IdentityBackend, IdentityStream};
pub use error::{BackendError, BackendResult};
pub use memory::{AccountSeed, InMemoryIdentityBackend, MIN_PASSWORD_LEN};
pub use model::{Destination, Identity, Role};
