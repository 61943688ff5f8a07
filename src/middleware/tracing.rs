// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Assigns request IDs and wraps every HTTP request in an http_request span
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::time::Duration;

use axum::Router;
use http::{HeaderValue, Request, Response};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::{MakeSpan, OnResponse, TraceLayer};
use tracing::{field::Empty, info, Span};
use uuid::Uuid;

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates `req_<uuid>` request ids
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestIdentifier;

impl MakeRequestId for MakeRequestIdentifier {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&new_request_id())
            .ok()
            .map(RequestId::new)
    }
}

/// Builds the `http_request` span for each request
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let span = create_request_span(request.method().as_str(), request.uri().path());
        if let Some(id) = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            span.record("request_id", id);
        }
        span
    }
}

/// Records status and latency once the response is ready
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordResponse;

impl<B> OnResponse<B> for RecordResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let duration_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        span.record("status_code", response.status().as_u16())
            .record("duration_ms", duration_ms);
        info!(parent: span, "Request completed");
    }
}

/// Generate a fresh request id
#[must_use]
pub fn new_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Create a tracing span for HTTP requests
#[must_use]
pub fn create_request_span(method: &str, path: &str) -> Span {
    tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = Empty,
        user_id = Empty,
        status_code = Empty,
        duration_ms = Empty,
    )
}

/// Wrap a router with request-id assignment, propagation and per-request spans
///
/// Incoming `x-request-id` headers are kept; otherwise a new id is generated.
/// The id is echoed on the response.
#[must_use]
pub fn with_request_tracing(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(RequestSpan)
                .on_response(RecordResponse),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestIdentifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        with_request_tracing(Router::new().route("/ping", get(|| async { "pong" })))
    }

    #[test]
    fn test_request_id_format() {
        let id = new_request_id();
        assert!(id.starts_with("req_"));
        assert_eq!(id.len(), 4 + 32);
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = app()
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(id.to_str().unwrap().starts_with("req_"));
    }

    #[tokio::test]
    async fn test_keeps_incoming_request_id() {
        let response = app()
            .oneshot(
                Request::get("/ping")
                    .header(REQUEST_ID_HEADER, "client-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "client-123");
    }
}
