// ABOUTME: HTTP middleware for request tracing, authentication, and CORS
// ABOUTME: Provides request ID generation, span creation, and token-to-user resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

pub mod auth;
pub mod cors;
pub mod tracing;

// Authentication middleware
pub use auth::{require_authentication, AuthMiddleware, AuthenticatedUser};

// CORS configuration
pub use cors::setup_cors;

// Request tracing and correlation ids
pub use self::tracing::{create_request_span, new_request_id, with_request_tracing, REQUEST_ID_HEADER};
