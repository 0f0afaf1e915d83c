//! The identity backend capability.

use crate::{BackendResult, Identity, Role};
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Stream of authoritative session changes. `None` means no active session.
pub type IdentityStream = BoxStream<'static, Option<Identity>>;

/// Credential verification and account operations performed by an external
/// identity provider.
///
/// Every async method may suspend on network latency. Implementations are
/// shared across tasks, so they must be `Send + Sync`.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Verify an email/password pair.
    ///
    /// Fails with `InvalidCredentials` or `Network`.
    async fn authenticate(&self, email: &str, password: &str) -> BackendResult<Identity>;

    /// Create an account and establish its session.
    ///
    /// Fails with `EmailAlreadyInUse`, `WeakPassword` or `Network`.
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> BackendResult<Identity>;

    /// End the active session. Best-effort: callers log and discard failures.
    async fn end_session(&self) -> BackendResult<()>;

    /// Synchronous snapshot of the active session, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Subscribe to session changes.
    ///
    /// The stream emits the current value first and then once per change
    /// (token expiry, external sign-out, relaunch). Each call returns a fresh,
    /// independent subscription.
    fn observe_identity(&self) -> IdentityStream;

    /// Send a password-reset message to `email`.
    ///
    /// Fails with `UnknownAccount` or `Network`.
    async fn issue_password_reset(&self, email: &str) -> BackendResult<()>;
}
