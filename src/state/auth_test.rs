use super::*;
use crate::backend::IdentityProvider;
use crate::backend::memory::MemoryBackend;

fn ada() -> User {
    User { id: "u1".into(), email: "ada@example.com".into(), name: "Ada".into() }
}

#[test]
fn starts_unknown() {
    let auth = AuthState::new();
    assert_eq!(auth.status(), AuthStatus::Unknown);
    assert!(!auth.status().is_known());
    assert!(!auth.is_authenticated());
    assert!(auth.user().is_none());
}

#[test]
fn login_then_logout() {
    let auth = AuthState::new();
    auth.login(ada());
    assert!(auth.is_authenticated());
    assert_eq!(auth.user(), Some(ada()));

    auth.logout();
    assert_eq!(auth.status(), AuthStatus::Unauthenticated);
    assert!(auth.user().is_none());
}

#[test]
fn clones_share_state() {
    let auth = AuthState::new();
    let other = auth.clone();
    auth.login(ada());
    assert!(other.is_authenticated());
}

#[tokio::test]
async fn subscribers_see_changes() {
    let auth = AuthState::new();
    let mut rx = auth.subscribe();

    auth.login(ada());
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().user(), Some(&ada()));

    auth.logout();
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), AuthStatus::Unauthenticated);
}

#[tokio::test]
async fn restore_without_session_is_unauthenticated() {
    let backend = Arc::new(MemoryBackend::new());
    let sessions = SessionClient::new(backend);
    let auth = AuthState::new();
    assert_eq!(auth.restore(&sessions).await, AuthStatus::Unauthenticated);
}

#[tokio::test]
async fn restore_picks_up_existing_session() {
    let backend = Arc::new(MemoryBackend::new());
    backend.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
    backend.create_session("ada@example.com", "secret1").await.unwrap();

    let sessions = SessionClient::new(backend);
    let auth = AuthState::new();
    let status = auth.restore(&sessions).await;
    assert_eq!(status.user().map(|u| u.email.as_str()), Some("ada@example.com"));
}
