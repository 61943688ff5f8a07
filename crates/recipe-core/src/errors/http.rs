// ABOUTME: Axum integration for AppError: status mapping and extractor rejections
// ABOUTME: Renders every error as the JSON ErrorResponse body with the code's HTTP status
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;

use super::{AppError, ErrorCode, ErrorResponse};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_server_error() {
            tracing::error!(
                code = ?self.code,
                source = ?self.source,
                "Request failed: {}",
                self.message
            );
        } else {
            tracing::debug!(code = ?self.code, "Request rejected: {}", self.message);
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let code = match rejection {
            JsonRejection::MissingJsonContentType(_) | JsonRejection::JsonSyntaxError(_) => {
                ErrorCode::InvalidFormat
            }
            _ => ErrorCode::InvalidInput,
        };
        Self::new(code, rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(ErrorCode::InvalidInput, rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        // Non-numeric ids can never match a row
        Self::new(ErrorCode::ResourceNotFound, rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_into_response_uses_code_status() {
        let response = AppError::missing_field("name").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "MISSING_REQUIRED_FIELD");
    }

    #[tokio::test]
    async fn test_auth_errors_are_unauthorized() {
        let response = AppError::auth_required().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
