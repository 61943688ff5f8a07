// ABOUTME: Unified error handling with standard error codes and JSON error bodies
// ABOUTME: Defines ErrorCode, AppError, AppResult and the ErrorResponse wire format
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! # Unified Error Handling System
//!
//! Every fallible operation in the server returns [`AppResult`]. An [`AppError`]
//! carries a stable [`ErrorCode`] that decides the HTTP status, a human-readable
//! message, and optional context (the offending field, the caller, free-form
//! details) that ends up in the JSON error body.

#[cfg(feature = "http-response")]
mod http;

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the application
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization (1000-1999)
    /// No credentials were supplied
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired = 1000,
    /// Credentials were supplied but are not valid
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid = 1001,
    /// Token has expired
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired = 1002,
    /// Token could not be parsed
    #[serde(rename = "AUTH_MALFORMED")]
    AuthMalformed = 1003,
    /// Authenticated but not allowed
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 1004,

    // Validation (3000-3999)
    /// Generic validation failure
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// A required field was absent or blank
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// A field had the wrong shape
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 3002,
    /// A numeric field was outside its allowed range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3003,

    // Resource Management (4000-4999)
    /// Row does not exist or is not visible to the caller
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// Unique constraint violated (duplicate email)
    #[serde(rename = "RESOURCE_ALREADY_EXISTS")]
    ResourceAlreadyExists = 4001,
    /// HTTP method not supported on this route
    #[serde(rename = "METHOD_NOT_ALLOWED")]
    MethodNotAllowed = 4005,

    // Configuration (6000-6999)
    /// Configuration could not be loaded or is invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal Errors (9000-9999)
    /// Unexpected server-side failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Storage layer failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// JSON encoding or decoding failed on the server side
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // Duplicate registration is reported as a validation failure
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidFormat
            | Self::ValueOutOfRange
            | Self::ResourceAlreadyExists => 400,

            Self::AuthRequired | Self::AuthInvalid | Self::AuthExpired | Self::AuthMalformed => {
                401
            }

            Self::PermissionDenied => 403,

            Self::ResourceNotFound => 404,

            Self::MethodNotAllowed => 405,

            Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication credentials were not provided",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::AuthExpired => "The authentication token has expired",
            Self::AuthMalformed => "The authentication token is malformed",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidFormat => "The data format is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::MethodNotAllowed => "The HTTP method is not allowed on this resource",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether this error is the server's fault rather than the caller's
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.http_status() >= 500
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// Authenticated user, if known
    pub user_id: Option<i64>,
    /// Request field the error refers to
    pub field: Option<String>,
    /// Additional key-value context
    pub details: Option<serde_json::Value>,
}

/// Unified error type for the application
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a request ID to the error context
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.context.request_id = Some(request_id.into());
        self
    }

    /// Add the authenticated user to the error context
    #[must_use]
    pub const fn with_user_id(mut self, user_id: i64) -> Self {
        self.context.user_id = Some(user_id);
        self
    }

    /// Name the request field the error refers to
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = Some(details);
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// No credentials on a protected route
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(
            ErrorCode::AuthRequired,
            "Authentication credentials were not provided",
        )
    }

    /// Credentials present but rejected
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Expired token
    #[must_use]
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Authentication token has expired")
    }

    /// Token that cannot be decoded
    pub fn auth_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthMalformed, message)
    }

    /// Generic validation failure
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Required field absent or blank
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{field} may not be blank"),
        )
        .with_field(field)
    }

    /// Numeric field outside its range
    pub fn out_of_range(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValueOutOfRange, message).with_field(field)
    }

    /// Resource not found (or not owned by the caller)
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Unique constraint violation
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Stable machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Request ID for support correlation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Extra details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        // 5xx messages can carry SQL or internal paths
        let message = if error.code.is_server_error() {
            error.code.description().to_owned()
        } else {
            error.message
        };

        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message,
                field: error.context.field,
                request_id: error.context.request_id,
                details: error.context.details,
            },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        use sqlx::Error as SqlxError;

        match error {
            SqlxError::RowNotFound => Self::not_found("Row"),
            other => Self::database(other.to_string()).with_source(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), 401);
        assert_eq!(ErrorCode::AuthExpired.http_status(), 401);
        assert_eq!(ErrorCode::MissingRequiredField.http_status(), 400);
        assert_eq!(ErrorCode::ResourceAlreadyExists.http_status(), 400);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::MethodNotAllowed.http_status(), 405);
        assert_eq!(ErrorCode::DatabaseError.http_status(), 500);
    }

    #[test]
    fn test_app_error_context() {
        let error = AppError::missing_field("name")
            .with_request_id("req-123")
            .with_user_id(7);

        assert_eq!(error.code, ErrorCode::MissingRequiredField);
        assert_eq!(error.context.field.as_deref(), Some("name"));
        assert_eq!(error.context.request_id.as_deref(), Some("req-123"));
        assert_eq!(error.context.user_id, Some(7));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::from(AppError::missing_field("name"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"]["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(json["error"]["field"], "name");
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn test_server_error_message_is_redacted() {
        let response = ErrorResponse::from(AppError::database("no such table: recipes"));
        assert_eq!(response.error.message, "Database operation failed");
    }
}
