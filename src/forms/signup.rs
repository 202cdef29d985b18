//! Signup form controller.

use tracing::warn;

use super::{FieldErrors, FormError, check_email, require};
use crate::routes::Route;
use crate::services::session::SessionClient;
use crate::state::auth::AuthState;

pub const MIN_PASSWORD_LEN: usize = 6;

pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    error: Option<String>,
    busy: bool,
    sessions: SessionClient,
    auth: AuthState,
}

impl SignupForm {
    #[must_use]
    pub fn new(sessions: SessionClient, auth: AuthState) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            error: None,
            busy: false,
            sessions,
            auth,
        }
    }

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
        require(&mut errors, "name", &self.name, "Full name is required");
        check_email(&mut errors, &self.email);
        if require(&mut errors, "password", &self.password, "Password is required")
            && self.password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.add("password", format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
        }
        errors
    }

    /// Create the account, sign in and return the next route.
    ///
    /// # Errors
    ///
    /// [`FormError::Invalid`] before any request, [`FormError::Session`] if
    /// registration or the follow-up sign-in failed.
    pub async fn submit(&mut self) -> Result<Route, FormError> {
        if self.busy {
            return Err(FormError::AlreadySubmitting);
        }
        self.error = None;
        self.validate().into_result()?;

        self.busy = true;
        let result = self.sessions.register(self.email.trim(), &self.password, self.name.trim()).await;
        let outcome = match result {
            Ok(_) => {
                match self.sessions.current_user().await {
                    Some(user) => self.auth.login(user),
                    None => {
                        warn!("registered but profile lookup returned nothing");
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
#[path = "signup_test.rs"]
mod tests;
