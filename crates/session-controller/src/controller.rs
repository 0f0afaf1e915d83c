//! Session controller.
//!
//! Sequences identity backend calls into state transitions and keeps the
//! state in step with the backend's own session notifications.

use crate::fsm::SessionEvent;
use crate::store::StateStore;
use crate::{ControllerConfig, ResubscribeConfig, SessionError, SessionResult, SessionState, StateSubscription};
use futures_util::StreamExt;
use identity_backend::{BackendError, BackendResult, IdentityBackend, Role};
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Message used when a failed sign-in carries no detail.
pub const SIGN_IN_FALLBACK: &str = "Sign in failed";
/// Message used when a failed sign-up carries no detail.
pub const SIGN_UP_FALLBACK: &str = "Sign up failed";
/// Message used when a failed password reset carries no detail.
pub const PASSWORD_RESET_FALLBACK: &str = "Password reset failed";

/// Owns the session state for one client.
///
/// Commands are serialized: a second command waits until the first has
/// settled, so their transitions never interleave. Identity notifications
/// from the backend are applied as they arrive.
pub struct SessionController {
    backend: Arc<dyn IdentityBackend>,
    store: Arc<StateStore>,
    gate: Mutex<()>,
    config: ControllerConfig,
    watcher: Option<JoinHandle<()>>,
}

impl SessionController {
    /// Create a controller and start watching the backend's session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(backend: Arc<dyn IdentityBackend>, config: ControllerConfig) -> SessionResult<Self> {
        let handle = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let store = Arc::new(StateStore::new(config.state_channel_capacity));

        let watcher = handle.spawn(watch_identity(
            backend.clone(),
            Arc::downgrade(&store),
            config.resubscribe.clone(),
        ));

        debug!(
            backend_timeout_ms = config.backend_timeout.map(|t| t.as_millis() as u64),
            capacity = config.state_channel_capacity,
            "Session controller started"
        );

        Ok(Self {
            backend,
            store,
            gate: Mutex::new(()),
            config,
            watcher: Some(watcher),
        })
    }

    /// Create a controller with default configuration.
    pub fn with_defaults(backend: Arc<dyn IdentityBackend>) -> SessionResult<Self> {
        Self::new(backend, ControllerConfig::default())
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The latest state.
    pub fn current_state(&self) -> SessionState {
        self.store.current()
    }

    /// Subscribe to state changes, starting with the current state.
    pub fn observe_state(&self) -> StateSubscription {
        StateSubscription::new(&self.store)
    }

    /// Authenticate with email and password.
    ///
    /// Inputs are passed to the backend unvalidated.
    pub async fn sign_in(&self, email: &str, password: &str) -> SessionState {
        let _guard = self.gate.lock().await;
        let request = self.begin(SIGN_IN_FALLBACK);

        let event = match self.call(self.backend.authenticate(email, password)).await {
            Ok(identity) => {
                info!(user_id = %identity.id, role = %identity.role, "Signed in");
                SessionEvent::CredentialsAccepted(identity)
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "Sign in failed");
                SessionEvent::RequestFailed(err.user_message(SIGN_IN_FALLBACK))
            }
        };

        request.settle(event)
    }

    /// Register a new account and sign into it.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> SessionState {
        let _guard = self.gate.lock().await;
        let request = self.begin(SIGN_UP_FALLBACK);

        let event = match self
            .call(self.backend.register(email, password, display_name, role))
            .await
        {
            Ok(identity) => {
                info!(user_id = %identity.id, role = %identity.role, "Signed up");
                SessionEvent::CredentialsAccepted(identity)
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "Sign up failed");
                SessionEvent::RequestFailed(err.user_message(SIGN_UP_FALLBACK))
            }
        };

        request.settle(event)
    }

    /// `sign_up` with the role given as its form label.
    ///
    /// Labels other than "Project Manager" register a team member.
    pub async fn sign_up_with_label(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role_label: &str,
    ) -> SessionState {
        let role = Role::from_label(role_label);
        self.sign_up(email, password, display_name, role).await
    }

    /// Ask the backend to send a password-reset message.
    ///
    /// Never establishes a session; success settles in `Unauthenticated`.
    pub async fn reset_password(&self, email: &str) -> SessionState {
        let _guard = self.gate.lock().await;
        let request = self.begin(PASSWORD_RESET_FALLBACK);

        let event = match self.call(self.backend.issue_password_reset(email)).await {
            Ok(()) => {
                info!("Password reset issued");
                SessionEvent::ResetIssued
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "Password reset failed");
                SessionEvent::RequestFailed(err.user_message(PASSWORD_RESET_FALLBACK))
            }
        };

        request.settle(event)
    }

    /// End the session. Always settles in `Unauthenticated`.
    pub async fn sign_out(&self) -> SessionState {
        let _guard = self.gate.lock().await;

        if let Err(err) = self.call(self.backend.end_session()).await {
            warn!(kind = err.kind(), error = %err, "Backend sign out failed, clearing local session anyway");
        }

        info!("Signed out");
        self.transition(SessionEvent::SignedOut)
    }

    /// Stop the identity watcher and wait for it to finish.
    ///
    /// Open subscriptions end once the controller is gone.
    pub async fn shutdown(mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
            let _ = watcher.await;
        }
        debug!("Session controller shut down");
    }

    /// Publish `Authenticating` and arm a guard that settles the request if
    /// the command future is dropped before the backend answers.
    fn begin(&self, fallback: &'static str) -> InFlight<'_> {
        self.transition(SessionEvent::RequestStarted);
        InFlight {
            controller: self,
            fallback,
            settled: false,
        }
    }

    fn transition(&self, event: SessionEvent) -> SessionState {
        match self.store.apply(event) {
            Ok(state) => state,
            Err(err) => {
                error!(error = %err, "Session transition rejected");
                self.store.current()
            }
        }
    }

    /// Run one backend call, bounded by the configured timeout.
    async fn call<T, F>(&self, request: F) -> BackendResult<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        let Some(limit) = self.config.backend_timeout else {
            return request.await;
        };

        match tokio::time::timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Network(format!(
                "request timed out after {}ms",
                limit.as_millis()
            ))),
        }
    }
}

/// An outstanding sign-in, sign-up or reset request.
///
/// Dropped unsettled, it moves the session to `Failed` with the operation's
/// fallback message so the state never stays `Authenticating`.
struct InFlight<'a> {
    controller: &'a SessionController,
    fallback: &'static str,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, event: SessionEvent) -> SessionState {
        self.settled = true;
        self.controller.transition(event)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(operation = self.fallback, "Request cancelled before the backend answered");
        self.controller
            .transition(SessionEvent::RequestFailed(self.fallback.to_string()));
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

/// Follow the backend's session for as long as the store exists.
async fn watch_identity(
    backend: Arc<dyn IdentityBackend>,
    store: Weak<StateStore>,
    resubscribe: ResubscribeConfig,
) {
    let mut attempt: u32 = 0;

    loop {
        let mut identities = backend.observe_identity();

        while let Some(identity) = identities.next().await {
            attempt = 0;
            let Some(live) = store.upgrade() else {
                return;
            };

            match identity {
                Some(identity) => {
                    debug!(user_id = %identity.id, "Identity observed");
                    if let Err(err) = live.apply(SessionEvent::IdentityObserved(identity)) {
                        error!(error = %err, "Identity transition rejected");
                    }
                }
                None => debug!("Backend reports no active session"),
            }
        }

        if store.strong_count() == 0 {
            return;
        }

        let delay = resubscribe.delay_for_attempt(attempt);
        warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Identity stream ended, resubscribing"
        );
        tokio::time::sleep(delay).await;
        attempt = attempt.saturating_add(1);
    }
}
