//! Login form controller.

use tracing::warn;

use super::{FieldErrors, FormError, check_email, require};
use crate::routes::Route;
use crate::services::session::SessionClient;
use crate::state::auth::AuthState;

pub struct LoginForm {
    pub email: String,
    pub password: String,
    error: Option<String>,
    busy: bool,
    sessions: SessionClient,
    auth: AuthState,
}

impl LoginForm {
    #[must_use]
    pub fn new(sessions: SessionClient, auth: AuthState) -> Self {
        Self { email: String::new(), password: String::new(), error: None, busy: false, sessions, auth }
    }

    /// Form-level message from the last failed submission.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn reset(&mut self) {
        self.busy = false;
        self.error = None;
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        require(&mut errors, "password", &self.password, "Password is required");
        errors
    }

    /// Sign in, publish the user to auth state and return the next route.
    ///
    /// # Errors
    ///
    /// [`FormError::Invalid`] before any request, [`FormError::Session`] if
    /// the backend refused. Auth state is untouched on failure.
    pub async fn submit(&mut self) -> Result<Route, FormError> {
        if self.busy {
            return Err(FormError::AlreadySubmitting);
        }
        self.error = None;
        self.validate().into_result()?;

        self.busy = true;
        let result = self.sessions.login(self.email.trim(), &self.password).await;
        let outcome = match result {
            Ok(_) => {
                match self.sessions.current_user().await {
                    Some(user) => self.auth.login(user),
                    None => {
                        warn!("signed in but profile lookup returned nothing");
                        self.auth.logout();
                    }
                }
                Ok(Route::Home)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        };
        self.busy = false;
        outcome
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
