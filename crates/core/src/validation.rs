//! Local validation of user input before anything reaches the network

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Validation failures raised before a request is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both your username and password")]
    MissingCredentials,

    #[error("Please enter your email address")]
    MissingEmail,
}

/// Username and password for a single submit action
///
/// Never persisted. The password is redacted from `Debug` output.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject empty or whitespace-only fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(())
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validate the email typed into the password-reset form
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        Err(ValidationError::MissingEmail)
    } else {
        Ok(())
    }
}
