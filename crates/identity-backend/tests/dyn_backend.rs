use futures_util::StreamExt;
use identity_backend::{AccountSeed, BackendError, IdentityBackend, InMemoryIdentityBackend, Role};
use std::sync::Arc;

fn shared_backend() -> Arc<dyn IdentityBackend> {
    Arc::new(InMemoryIdentityBackend::with_accounts([AccountSeed {
        id: None,
        email: "lead@pulse.dev".to_string(),
        password: "correct horse".to_string(),
        display_name: "Lead".to_string(),
        role: Role::ProjectManager,
        avatar_url: Some("https://cdn.pulse.dev/lead.png".to_string()),
    }]))
}

#[tokio::test]
async fn backend_is_usable_as_trait_object_across_tasks() {
    let backend = shared_backend();

    let task_backend = backend.clone();
    let identity = tokio::spawn(async move {
        task_backend
            .authenticate("lead@pulse.dev", "correct horse")
            .await
    })
    .await
    .expect("task panicked")
    .expect("authenticate failed");

    assert_eq!(identity.role, Role::ProjectManager);
    assert_eq!(identity.destination().route(), "pm_dashboard");
    assert_eq!(
        identity.avatar_url.as_deref(),
        Some("https://cdn.pulse.dev/lead.png")
    );
    assert_eq!(backend.current_identity(), Some(identity));
}

#[tokio::test]
async fn each_observer_gets_an_independent_subscription() {
    let backend = shared_backend();
    let mut first = backend.observe_identity();
    let mut second = backend.observe_identity();

    assert_eq!(first.next().await, Some(None));
    assert_eq!(second.next().await, Some(None));

    let identity = backend
        .authenticate("lead@pulse.dev", "correct horse")
        .await
        .unwrap();

    assert_eq!(first.next().await, Some(Some(identity.clone())));
    assert_eq!(second.next().await, Some(Some(identity)));
}

#[tokio::test]
async fn failures_render_user_messages() {
    let backend = shared_backend();

    let err = backend.issue_password_reset("x@y.com").await.unwrap_err();
    assert!(matches!(err, BackendError::UnknownAccount(_)));
    assert!(err
        .user_message("Password reset failed")
        .starts_with("UnknownAccount: "));
}
