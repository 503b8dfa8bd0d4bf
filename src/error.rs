//! Wire-level error translation.
//!
//! Every per-request failure funnels through [`ApiError`]: a fixed taxonomy
//! with exactly one status code per kind and a structured JSON body. Stack
//! traces and internal identifiers never reach the wire.
//!
//! Invalid configuration is deliberately not represented here — it aborts
//! startup via [`crate::config::ConfigError`] and never reaches a request.
//! CORS rejection is also absent: it is answered silently by the CORS
//! middleware to avoid origin-enumeration side channels.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Per-request failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed input (400).
    BadRequest(String),

    /// Missing or invalid credentials (401).
    Unauthenticated(String),

    /// The principal is authenticated but lacks the required role (403).
    Forbidden(String),

    /// No such resource (404).
    NotFound(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// The one status code for this failure kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthenticated(m)
            | Self::Forbidden(m)
            | Self::NotFound(m) => m,
        }
    }
}

/// Structured error body returned for every translated failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Numeric HTTP status, duplicated in the body for log scrapers.
    pub status: u16,
    /// Human-readable message. Never a stack trace or internal identifier.
    pub message: String,
    /// ISO-8601 timestamp of when the error was translated.
    pub timestamp: String,
}

impl ErrorBody {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status: status.as_u16(),
            message: message.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody::new(status, self.message());
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(m) => write!(f, "Bad request: {}", m),
            Self::Unauthenticated(m) => write!(f, "Unauthenticated: {}", m),
            Self::Forbidden(m) => write!(f, "Forbidden: {}", m),
            Self::NotFound(m) => write!(f, "Not found: {}", m),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    #[test]
    fn test_status_mapping_is_fixed() {
        assert_eq!(
            ApiError::bad_request("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthenticated("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_body_carries_status_and_message() {
        let body = ErrorBody::new(StatusCode::FORBIDDEN, "Access forbidden");
        assert_eq!(body.status, 403);
        assert_eq!(body.message, "Access forbidden");
    }

    #[test]
    fn test_timestamp_is_iso8601() {
        let body = ErrorBody::new(StatusCode::NOT_FOUND, "Resource not found");
        assert!(
            DateTime::parse_from_rfc3339(&body.timestamp).is_ok(),
            "timestamp should parse as RFC 3339: {}",
            body.timestamp
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::forbidden("Access forbidden").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_display_includes_message() {
        let err = ApiError::unauthenticated("Authentication credentials required");
        assert!(err.to_string().contains("Authentication credentials required"));
    }
}
