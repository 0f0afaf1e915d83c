//! Process-local identity backend.
//!
//! Holds accounts in memory and publishes the active session through a watch
//! channel. Used by the test suites and the `pulse` harness; it is not a real
//! identity provider.

use crate::{BackendError, BackendResult, Identity, IdentityBackend, IdentityStream, Role};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Account definition used to pre-populate the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSeed {
    /// Fixed identity id; a UUID is generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

struct Account {
    password_digest: Vec<u8>,
    identity: Identity,
}

/// In-memory `IdentityBackend`.
pub struct InMemoryIdentityBackend {
    /// Keyed by normalized email.
    accounts: Mutex<HashMap<String, Account>>,
    session: watch::Sender<Option<Identity>>,
    offline: AtomicBool,
    latency: Mutex<Option<Duration>>,
    issued_resets: Mutex<Vec<String>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest(password: &str) -> Vec<u8> {
    Sha256::digest(password.as_bytes()).to_vec()
}

impl InMemoryIdentityBackend {
    /// Create an empty backend with no active session.
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session,
            offline: AtomicBool::new(false),
            latency: Mutex::new(None),
            issued_resets: Mutex::new(Vec::new()),
        }
    }

    /// Create a backend pre-populated with accounts.
    pub fn with_accounts(seeds: impl IntoIterator<Item = AccountSeed>) -> Self {
        let backend = Self::new();
        backend.seed_accounts(seeds);
        backend
    }

    /// Add accounts, replacing any existing account with the same email.
    pub fn seed_accounts(&self, seeds: impl IntoIterator<Item = AccountSeed>) {
        let mut accounts = self.accounts.lock();
        for seed in seeds {
            let identity = Identity {
                id: seed.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                email: seed.email.trim().to_string(),
                display_name: seed.display_name,
                role: seed.role,
                avatar_url: seed.avatar_url,
            };
            accounts.insert(
                normalize_email(&seed.email),
                Account {
                    password_digest: digest(&seed.password),
                    identity,
                },
            );
        }
    }

    /// Make every fallible call fail with `Network` while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every async call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Simulate the provider dropping the session (token expiry, remote sign-out).
    pub fn expire_session(&self) {
        info!("Session expired externally");
        self.session.send_replace(None);
    }

    /// Simulate the provider restoring a session (app relaunch with stored token).
    pub fn restore_session(&self, identity: Identity) {
        info!(user_id = %identity.id, "Session restored externally");
        self.session.send_replace(Some(identity));
    }

    /// Emails that received a password reset, in issue order.
    pub fn issued_resets(&self) -> Vec<String> {
        self.issued_resets.lock().clone()
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.lock().len()
    }

    async fn round_trip(&self) -> BackendResult<()> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(BackendError::Network("identity provider unreachable".to_string()));
        }
        Ok(())
    }

    fn start_session(&self, identity: &Identity) {
        self.session.send_replace(Some(identity.clone()));
    }
}

impl Default for InMemoryIdentityBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityBackend for InMemoryIdentityBackend {
    async fn authenticate(&self, email: &str, password: &str) -> BackendResult<Identity> {
        self.round_trip().await?;

        let identity = {
            let accounts = self.accounts.lock();
            match accounts.get(&normalize_email(email)) {
                Some(account) if account.password_digest == digest(password) => {
                    account.identity.clone()
                }
                _ => {
                    return Err(BackendError::InvalidCredentials(
                        "email or password is incorrect".to_string(),
                    ))
                }
            }
        };

        debug!(user_id = %identity.id, "Credentials accepted");
        self.start_session(&identity);
        Ok(identity)
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> BackendResult<Identity> {
        self.round_trip().await?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::WeakPassword(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let identity = {
            let mut accounts = self.accounts.lock();
            let key = normalize_email(email);
            if accounts.contains_key(&key) {
                return Err(BackendError::EmailAlreadyInUse(format!(
                    "an account already exists for {}",
                    email.trim()
                )));
            }

            let identity = Identity::new(
                Uuid::new_v4().to_string(),
                email.trim(),
                display_name,
                role,
            );
            accounts.insert(
                key,
                Account {
                    password_digest: digest(password),
                    identity: identity.clone(),
                },
            );
            identity
        };

        info!(user_id = %identity.id, role = %identity.role, "Account registered");
        self.start_session(&identity);
        Ok(identity)
    }

    async fn end_session(&self) -> BackendResult<()> {
        self.round_trip().await?;
        self.session.send_replace(None);
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.session.borrow().clone()
    }

    fn observe_identity(&self) -> IdentityStream {
        let rx = self.session.subscribe();
        Box::pin(futures_util::stream::unfold(
            (rx, true),
            |(mut rx, first)| async move {
                if !first {
                    rx.changed().await.ok()?;
                }
                let value = rx.borrow_and_update().clone();
                Some((value, (rx, false)))
            },
        ))
    }

    async fn issue_password_reset(&self, email: &str) -> BackendResult<()> {
        self.round_trip().await?;

        if !self.accounts.lock().contains_key(&normalize_email(email)) {
            return Err(BackendError::UnknownAccount(format!(
                "no account registered for {}",
                email.trim()
            )));
        }

        self.issued_resets.lock().push(email.trim().to_string());
        debug!("Password reset issued");
        Ok(())
    }
}
