//! Backend request errors
//!
//! Non-success responses are decoded from the backend error payload so the
//! caller can show the backend's own message.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message shown when the backend gives nothing usable
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Error body returned by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    /// Per-field validation messages
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorPayload {
    /// First non-empty human readable message
    pub fn best_message(&self) -> Option<String> {
        [&self.message, &self.error, &self.detail]
            .into_iter()
            .flatten()
            .map(|m| m.trim())
            .find(|m| !m.is_empty())
            .map(str::to_string)
    }
}

/// Backend request error
///
/// `Clone` so a single failed in-flight request can be handed to every
/// caller waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Token missing or expired, the session has been terminated
    #[error("Unauthorized")]
    Unauthorized,

    /// Form-level validation failure, surfaced per field
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("HTTP {status}{}", message_suffix(.message))]
    Http { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default()
}

impl ApiError {
    /// Client-side required-field failure
    pub fn required(field: &str) -> Self {
        Self::invalid_field(field, "This field is required")
    }

    pub fn invalid_field(field: &str, reason: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![reason.to_string()]);
        ApiError::Validation {
            message: format!("{}: {}", field, reason),
            fields,
        }
    }

    /// Classify a non-success response from its status and raw body
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }

        let payload: ErrorPayload = serde_json::from_slice(body).unwrap_or_default();
        let message = payload.best_message();

        let is_validation = status == 422 || (status == 400 && payload.errors.is_some());
        if is_validation {
            return ApiError::Validation {
                message: message.unwrap_or_else(|| "Validation failed".to_string()),
                fields: payload.errors.unwrap_or_default(),
            };
        }

        ApiError::Http { status, message }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }

    /// Message suitable for a user-facing notice
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Session expired. Please sign in again.".to_string(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Http { message: Some(message), .. } => message.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_status() {
        assert!(matches!(ApiError::from_response(401, b""), ApiError::Unauthorized));
    }

    #[test]
    fn test_message_taken_from_payload() {
        let error = ApiError::from_response(409, br#"{"error":"Casino name already exists"}"#);
        assert_eq!(error.user_message(), "Casino name already exists");
    }

    #[test]
    fn test_blank_payload_falls_back_to_generic() {
        let error = ApiError::from_response(500, b"<html>gateway</html>");
        assert_eq!(error.user_message(), GENERIC_ERROR_MESSAGE);

        let error = ApiError::from_response(500, br#"{"message":"   "}"#);
        assert_eq!(error.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_validation_errors_detected() {
        let error = ApiError::from_response(
            400,
            br#"{"message":"Invalid bonus","errors":{"geo":["Unknown GEO"]}}"#,
        );
        match error {
            ApiError::Validation { message, fields } => {
                assert_eq!(message, "Invalid bonus");
                assert_eq!(fields["geo"], vec!["Unknown GEO".to_string()]);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }

        assert!(ApiError::from_response(422, b"{}").is_validation());
        assert!(!ApiError::from_response(400, br#"{"detail":"bad"}"#).is_validation());
    }

    #[test]
    fn test_http_display() {
        let error = ApiError::Http { status: 404, message: Some("Casino not found".to_string()) };
        assert_eq!(error.to_string(), "HTTP 404: Casino not found");
        let error = ApiError::Http { status: 502, message: None };
        assert_eq!(error.to_string(), "HTTP 502");
    }
}
