//! Authentication state shared by the guard, forms and views.
//!
//! DESIGN
//! ======
//! Status lives in a `tokio::sync::watch` channel. Writers (`login`,
//! `logout`, `restore`) replace the value; readers either peek at it or hold
//! a receiver and wake on every change, which is how the route guard
//! re-evaluates after sign-in and sign-out.
//!
//! LIFECYCLE
//! =========
//! A fresh state starts `Unknown` until the first session lookup resolves.
//! After that it only moves between `Authenticated` and `Unauthenticated`.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::model::User;
use crate::services::session::SessionClient;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// Session lookup has not finished yet.
    #[default]
    Unknown,
    Authenticated(User),
    Unauthenticated,
}

impl AuthStatus {
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthState {
    tx: Arc<watch::Sender<AuthStatus>>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthState {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthStatus::Unknown);
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.tx.borrow(), AuthStatus::Authenticated(_))
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.tx.borrow().user().cloned()
    }

    pub fn login(&self, user: User) {
        info!(user_id = %user.id, "auth state: signed in");
        self.tx.send_replace(AuthStatus::Authenticated(user));
    }

    pub fn logout(&self) {
        let previous = self.tx.send_replace(AuthStatus::Unauthenticated);
        if let AuthStatus::Authenticated(user) = previous {
            info!(user_id = %user.id, "auth state: signed out");
        }
    }

    /// Receiver that wakes on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.tx.subscribe()
    }

    /// Resolve `Unknown` from the backend session, if any. Returns the new
    /// status.
    pub async fn restore(&self, sessions: &SessionClient) -> AuthStatus {
        match sessions.current_user().await {
            Some(user) => self.login(user),
            None => {
                debug!("no session to restore");
                self.tx.send_replace(AuthStatus::Unauthenticated);
            }
        }
        self.status()
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
