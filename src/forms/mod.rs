//! Form controllers: login, signup and the post editor.
//!
//! DESIGN
//! ======
//! A controller owns its field values, validates them without touching the
//! network, then drives the service calls for one submission and reports
//! where the app should navigate next. Validation failures come back as
//! [`FieldErrors`] keyed by field name so a front-end can place each message
//! next to its input.
//!
//! Submission takes `&mut self`, so one controller never runs two requests at
//! once. The `busy` flag still guards against a submit future that was
//! dropped half-way; `reset` clears it.

pub mod editor;
pub mod login;
pub mod progress;
pub mod signup;

use std::collections::BTreeMap;
use std::fmt;

use crate::services::content::ContentError;
use crate::services::session::SessionError;

/// Per-field validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// [`FormError::Invalid`] carrying every recorded message.
    pub fn into_result(self) -> Result<(), FormError> {
        if self.is_empty() { Ok(()) } else { Err(FormError::Invalid(self)) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("you must be signed in")]
    NotAuthenticated,
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Content(#[from] ContentError),
}

impl FormError {
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

// =============================================================================
// SHARED CHECKS
// =============================================================================

/// Address check used by the signup and login forms: word characters
/// separated by single `.` or `-`, an `@`, and a domain ending in a 2-3
/// character label.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    is_separated_words(local)
        && is_separated_words(host)
        && (2..=3).contains(&tld.len())
        && tld.chars().all(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_separated_words(value: &str) -> bool {
    !value.is_empty() && value.split(['.', '-']).all(|part| !part.is_empty() && part.chars().all(is_word_char))
}

pub(crate) fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, message);
        false
    } else {
        true
    }
}

pub(crate) fn check_email(errors: &mut FieldErrors, value: &str) {
    if require(errors, "email", value, "Email is required") && !is_valid_email(value.trim()) {
        errors.add("email", "Email address must be valid");
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
