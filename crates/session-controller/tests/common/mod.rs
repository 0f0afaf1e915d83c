#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::stream;
use identity_backend::{BackendError, BackendResult, Identity, IdentityBackend, IdentityStream, Role};
use parking_lot::Mutex;
use session_controller::{ControllerConfig, ResubscribeConfig, SessionController, SessionState, StateSubscription};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Identity for the standard signed-in team member.
pub fn ada() -> Identity {
    Identity::new("u1", "a@b.com", "Ada", Role::TeamMember)
}

/// Identity for a project manager.
pub fn pat() -> Identity {
    Identity::new("u2", "pm@b.com", "Pat", Role::ProjectManager)
}

/// Backend whose every answer is queued by the test.
///
/// Unscripted calls fail with `Unknown`, except `end_session` which succeeds.
/// Each `observe_identity` call takes the next feed added with `add_feed`;
/// once feeds run out it returns a stream that never yields.
#[derive(Default)]
pub struct ScriptedBackend {
    authenticate: Mutex<VecDeque<BackendResult<Identity>>>,
    register: Mutex<VecDeque<BackendResult<Identity>>>,
    reset: Mutex<VecDeque<BackendResult<()>>>,
    end_session: Mutex<VecDeque<BackendResult<()>>>,
    feeds: Mutex<VecDeque<mpsc::UnboundedReceiver<Option<Identity>>>>,
    registered_roles: Mutex<Vec<Role>>,
    calls: Mutex<Vec<&'static str>>,
    observe_calls: AtomicUsize,
    latency: Mutex<Option<Duration>>,
    hang: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_authenticate(&self, result: BackendResult<Identity>) {
        self.authenticate.lock().push_back(result);
    }

    pub fn push_register(&self, result: BackendResult<Identity>) {
        self.register.lock().push_back(result);
    }

    pub fn push_reset(&self, result: BackendResult<()>) {
        self.reset.lock().push_back(result);
    }

    pub fn push_end_session(&self, result: BackendResult<()>) {
        self.end_session.lock().push_back(result);
    }

    /// Queue an identity stream. Dropping the sender ends that stream.
    pub fn add_feed(&self) -> mpsc::UnboundedSender<Option<Identity>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().push_back(rx);
        tx
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Make every async call wait forever.
    pub fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub fn registered_roles(&self) -> Vec<Role> {
        self.registered_roles.lock().clone()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn observe_calls(&self) -> usize {
        self.observe_calls.load(Ordering::SeqCst)
    }

    async fn round_trip(&self, name: &'static str) {
        self.calls.lock().push(name);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn unscripted<T>(call: &str) -> BackendResult<T> {
    Err(BackendError::Unknown(format!("unscripted {} call", call)))
}

#[async_trait]
impl IdentityBackend for ScriptedBackend {
    async fn authenticate(&self, _email: &str, _password: &str) -> BackendResult<Identity> {
        self.round_trip("authenticate").await;
        self.authenticate
            .lock()
            .pop_front()
            .unwrap_or_else(|| unscripted("authenticate"))
    }

    async fn register(
        &self,
        _email: &str,
        _password: &str,
        _display_name: &str,
        role: Role,
    ) -> BackendResult<Identity> {
        self.round_trip("register").await;
        self.registered_roles.lock().push(role);
        self.register
            .lock()
            .pop_front()
            .unwrap_or_else(|| unscripted("register"))
    }

    async fn end_session(&self) -> BackendResult<()> {
        self.round_trip("end_session").await;
        self.end_session.lock().pop_front().unwrap_or(Ok(()))
    }

    fn current_identity(&self) -> Option<Identity> {
        None
    }

    fn observe_identity(&self) -> IdentityStream {
        self.observe_calls.fetch_add(1, Ordering::SeqCst);
        match self.feeds.lock().pop_front() {
            Some(rx) => Box::pin(stream::unfold(rx, |mut rx| async move {
                let identity = rx.recv().await?;
                Some((identity, rx))
            })),
            None => Box::pin(stream::pending::<Option<Identity>>()),
        }
    }

    async fn issue_password_reset(&self, _email: &str) -> BackendResult<()> {
        self.round_trip("issue_password_reset").await;
        self.reset
            .lock()
            .pop_front()
            .unwrap_or_else(|| unscripted("issue_password_reset"))
    }
}

/// Config with fast resubscribe backoff for tests.
pub fn test_config() -> ControllerConfig {
    ControllerConfig {
        resubscribe: ResubscribeConfig {
            initial_delay_ms: 10,
            max_delay_ms: 40,
        },
        ..ControllerConfig::default()
    }
}

pub fn controller(backend: &Arc<ScriptedBackend>) -> SessionController {
    SessionController::new(backend.clone(), test_config()).expect("failed to create controller")
}

/// Everything the subscription has buffered right now.
pub fn drain(states: &mut StateSubscription) -> Vec<SessionState> {
    let mut drained = Vec::new();
    while let Some(state) = states.try_next() {
        drained.push(state);
    }
    drained
}

/// Wait for the next state, failing the test after one second.
pub async fn next_state(states: &mut StateSubscription) -> SessionState {
    tokio::time::timeout(Duration::from_secs(1), states.next())
        .await
        .expect("timed out waiting for state")
        .expect("subscription ended")
}
