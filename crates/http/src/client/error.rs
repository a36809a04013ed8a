//! Client error types

use portal_core::{StorageError, ValidationError};
use portal_core::types::ApiResponse;
use thiserror::Error;

/// Maximum number of error body characters kept for display
const MAX_ERROR_CHARS: usize = 200;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected locally, nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server refused the credentials
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// No response was received
    #[error("Unable to reach the server: {0}")]
    Connectivity(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// An authenticated call came back `401`
    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    /// Server returned another error status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response decoded but was not usable
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Session could not be written or cleared
    #[error("Session storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Create error from HTTP status code and raw body
    ///
    /// The backend wraps errors in the usual envelope; its `message` is used
    /// when present, otherwise the trimmed body.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

        match status.as_u16() {
            401 => Self::SessionExpired { message },
            code => Self::Server {
                status: code,
                message,
            },
        }
    }

    /// Classify a transport failure (no usable response)
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_builder() {
            Self::Configuration(error.to_string())
        } else if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else {
            Self::Connectivity(error.to_string())
        }
    }

    /// Whether this error means the session is no longer valid
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Whether no response was received at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::Timeout(_))
    }

    /// Text suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Authentication { message } | Self::Server { message, .. } => message.clone(),
            Self::Connectivity(_) => "Unable to connect to the server".to_string(),
            Self::Timeout(_) => "The server took too long to respond. Please try again".to_string(),
            Self::SessionExpired { .. } => {
                "Your session has expired. Please log in again".to_string()
            }
            Self::Decode(_) | Self::InvalidResponse(_) => {
                "The server sent a response that could not be read".to_string()
            }
            Self::Configuration(_) | Self::Storage(_) => self.to_string(),
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(envelope) = serde_json::from_str::<ApiResponse<serde_json::Value>>(trimmed) {
        if let Some(message) = envelope.message.filter(|m| !m.trim().is_empty()) {
            return Some(message);
        }
    }

    Some(trimmed.chars().take(MAX_ERROR_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn unauthorized_maps_to_session_expired() {
        let error = ClientError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"success":false,"message":"Invalid username or password"}"#,
        );
        assert!(error.is_auth_expired());
        assert!(matches!(
            error,
            ClientError::SessionExpired { ref message } if message == "Invalid username or password"
        ));
    }

    #[test]
    fn server_error_keeps_envelope_message() {
        let error = ClientError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"success":false,"message":"Database unavailable","data":null}"#,
        );
        assert_eq!(error.user_message(), "Database unavailable");
    }

    #[test]
    fn plain_body_is_truncated() {
        let body = "x".repeat(500);
        let error = ClientError::from_status(StatusCode::BAD_GATEWAY, &body);
        match error {
            ClientError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), MAX_ERROR_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_body_falls_back_to_reason() {
        let error = ClientError::from_status(StatusCode::FORBIDDEN, "  ");
        assert_eq!(error.user_message(), "Forbidden");
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let error = ClientError::from(ValidationError::MissingCredentials);
        assert_eq!(
            error.user_message(),
            "Please enter both your username and password"
        );
    }
}
