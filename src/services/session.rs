//! Account sessions: register, login, profile lookup and logout.
//!
//! ERROR HANDLING
//! ==============
//! Register, login and logout always propagate backend failures so the
//! calling form can show them. Profile lookup is the exception: "no session"
//! and "lookup failed" both mean signed out, so it logs and returns `None`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{BackendError, IdentityProvider};
use crate::model::{Session, User};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Register(BackendError),
    #[error("{0}")]
    Login(BackendError),
    #[error("{0}")]
    Logout(BackendError),
}

impl SessionError {
    /// Underlying backend failure.
    #[must_use]
    pub fn backend(&self) -> &BackendError {
        match self {
            Self::Register(e) | Self::Login(e) | Self::Logout(e) => e,
        }
    }
}

#[derive(Clone)]
pub struct SessionClient {
    identity: Arc<dyn IdentityProvider>,
}

impl SessionClient {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// Create an account and sign straight into it.
    ///
    /// # Errors
    ///
    /// [`SessionError::Register`] if the account could not be created (for
    /// example a duplicate email), [`SessionError::Login`] if the follow-up
    /// sign-in failed.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<Session, SessionError> {
        let user = self
            .identity
            .create_account(email, password, name)
            .await
            .map_err(SessionError::Register)?;
        info!(user_id = %user.id, "account created");
        self.login(email, password).await
    }

    /// Start a session with email and password.
    ///
    /// # Errors
    ///
    /// [`SessionError::Login`] with the backend's reason.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let session = self
            .identity
            .create_session(email, password)
            .await
            .map_err(SessionError::Login)?;
        info!(user_id = %session.user_id, session_id = %session.id, "session created");
        Ok(session)
    }

    /// Profile behind the active session, `None` when signed out or on failure.
    pub async fn current_user(&self) -> Option<User> {
        match self.identity.current_account().await {
            Ok(user) => Some(user),
            Err(e) if e.is_unauthorized() => {
                debug!("no active session");
                None
            }
            Err(e) => {
                warn!(error = %e, "current user lookup failed");
                None
            }
        }
    }

    /// End every session of the current user.
    ///
    /// # Errors
    ///
    /// [`SessionError::Logout`] if the backend refused. Callers clear local
    /// auth state regardless.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.identity.delete_sessions().await.map_err(SessionError::Logout)?;
        info!("sessions deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
