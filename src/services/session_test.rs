use super::*;
use crate::backend::memory::{MemoryBackend, Operation};

fn client() -> (SessionClient, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    (SessionClient::new(backend.clone()), backend)
}

// =============================================================================
// register
// =============================================================================

#[tokio::test]
async fn register_signs_in_immediately() {
    let (sessions, _) = client();
    let session = sessions.register("ada@example.com", "secret1", "Ada").await.unwrap();
    let user = sessions.current_user().await.unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.name, "Ada");
    assert_eq!(session.user_id, user.id);
}

#[tokio::test]
async fn register_duplicate_email_fails_without_session() {
    let (sessions, _) = client();
    sessions.register("ada@example.com", "secret1", "Ada").await.unwrap();
    sessions.logout().await.unwrap();

    let err = sessions.register("ada@example.com", "secret2", "Other").await.unwrap_err();
    assert!(matches!(err, SessionError::Register(BackendError::Conflict(_))));
    assert!(sessions.current_user().await.is_none());
}

#[tokio::test]
async fn register_reports_login_failure_separately() {
    let (sessions, backend) = client();
    backend.fail(Operation::CreateSession);
    let err = sessions.register("ada@example.com", "secret1", "Ada").await.unwrap_err();
    assert!(matches!(err, SessionError::Login(_)));
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn login_failure_is_propagated() {
    let (sessions, _) = client();
    let err = sessions.login("nobody@example.com", "whatever").await.unwrap_err();
    assert!(err.backend().is_unauthorized());
    assert!(err.to_string().contains("Invalid credentials"));
}

#[tokio::test]
async fn login_existing_account() {
    let (sessions, backend) = client();
    backend.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
    assert!(sessions.current_user().await.is_none());

    sessions.login("ada@example.com", "secret1").await.unwrap();
    assert!(sessions.current_user().await.is_some());
}

// =============================================================================
// current_user
// =============================================================================

#[tokio::test]
async fn current_user_swallows_backend_failure() {
    let (sessions, _) = client();
    sessions.register("ada@example.com", "secret1", "Ada").await.unwrap();
    let (sessions_2, backend_2) = client();
    backend_2.fail(Operation::CurrentAccount);
    assert!(sessions_2.current_user().await.is_none());
    assert!(sessions.current_user().await.is_some());
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_ends_session() {
    let (sessions, _) = client();
    sessions.register("ada@example.com", "secret1", "Ada").await.unwrap();
    sessions.logout().await.unwrap();
    assert!(sessions.current_user().await.is_none());
}

#[tokio::test]
async fn logout_without_session_errors() {
    let (sessions, _) = client();
    assert!(matches!(sessions.logout().await, Err(SessionError::Logout(_))));
}
