//! Application root.
//!
//! DESIGN
//! ======
//! `App` owns the service clients and the one [`AuthState`] every form, view
//! and guard shares. It is built once at startup (from config, or over the
//! in-memory backend) and passed around by reference; there is no global
//! session flag.
//!
//! LIFECYCLE
//! =========
//! `new` leaves auth `Unknown`. `start` resolves it from the backend session.
//! Forms update it on login and signup, `logout` clears it. Dropping the app
//! drops the state and ends every guard watch.

use std::sync::Arc;

use tracing::warn;

use crate::backend::appwrite::AppwriteBackend;
use crate::backend::memory::MemoryBackend;
use crate::backend::{BackendError, DocumentStore, IdentityProvider, ObjectStore};
use crate::config::BackendConfig;
use crate::forms::editor::PostEditor;
use crate::forms::login::LoginForm;
use crate::forms::signup::SignupForm;
use crate::routes::{GuardDecision, Route, RouteGuard};
use crate::services::content::ContentClient;
use crate::services::session::{SessionClient, SessionError};
use crate::state::auth::{AuthState, AuthStatus};

#[derive(Clone)]
pub struct App {
    sessions: SessionClient,
    content: ContentClient,
    auth: AuthState,
    guard: RouteGuard,
}

impl App {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
        files: Arc<dyn ObjectStore>,
    ) -> Self {
        let auth = AuthState::new();
        Self {
            sessions: SessionClient::new(identity),
            content: ContentClient::new(documents, files),
            guard: RouteGuard::new(auth.clone()),
            auth,
        }
    }

    /// App over the hosted backend.
    ///
    /// # Errors
    ///
    /// [`BackendError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let backend = Arc::new(AppwriteBackend::new(config)?);
        Ok(Self::new(backend.clone(), backend.clone(), backend))
    }

    /// App over a fresh in-memory backend, returned alongside it.
    #[must_use]
    pub fn in_memory() -> (Self, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (Self::new(backend.clone(), backend.clone(), backend.clone()), backend)
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionClient {
        &self.sessions
    }

    #[must_use]
    pub fn content(&self) -> &ContentClient {
        &self.content
    }

    #[must_use]
    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Resolve the initial auth status from the backend session.
    pub async fn start(&self) -> AuthStatus {
        self.auth.restore(&self.sessions).await
    }

    /// Guard decision for `path`, waiting for the auth status if needed.
    /// `None` for paths outside the route table.
    pub async fn navigate(&self, path: &str) -> Option<(Route, GuardDecision)> {
        let route = Route::parse(path)?;
        let decision = self.guard.resolve(&route).await;
        Some((route, decision))
    }

    /// End the backend session and clear auth state. The state is cleared
    /// even when the backend call fails.
    ///
    /// # Errors
    ///
    /// [`SessionError::Logout`] from the backend, after auth is cleared.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let result = self.sessions.logout().await;
        self.auth.logout();
        if let Err(e) = &result {
            warn!(error = %e, "logout failed on backend; local session cleared");
        }
        result
    }

    #[must_use]
    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(self.sessions.clone(), self.auth.clone())
    }

    #[must_use]
    pub fn signup_form(&self) -> SignupForm {
        SignupForm::new(self.sessions.clone(), self.auth.clone())
    }

    #[must_use]
    pub fn new_post_editor(&self) -> PostEditor {
        PostEditor::create(self.content.clone(), self.auth.clone())
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
