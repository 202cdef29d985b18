use super::*;
use crate::backend::memory::Operation;

#[tokio::test]
async fn start_resolves_unknown() {
    let (app, _) = App::in_memory();
    assert_eq!(app.auth().status(), AuthStatus::Unknown);
    assert_eq!(app.start().await, AuthStatus::Unauthenticated);
}

#[tokio::test]
async fn navigate_applies_guard() {
    let (app, _) = App::in_memory();
    app.start().await;

    assert_eq!(
        app.navigate("/add-post").await,
        Some((Route::AddPost, GuardDecision::Redirect(Route::Login)))
    );
    assert_eq!(app.navigate("/").await, Some((Route::Home, GuardDecision::Render)));
    assert_eq!(app.navigate("/missing").await, None);
}

#[tokio::test]
async fn logout_clears_auth_even_on_backend_failure() {
    let (app, backend) = App::in_memory();
    let mut form = app.signup_form();
    form.name = "Ada".into();
    form.email = "ada@example.com".into();
    form.password = "secret1".into();
    form.submit().await.unwrap();
    assert!(app.auth().is_authenticated());

    backend.fail(Operation::DeleteSessions);
    assert!(app.logout().await.is_err());
    assert!(!app.auth().is_authenticated());
    assert_eq!(app.guard().check(&Route::AllPosts), GuardDecision::Redirect(Route::Login));
}
