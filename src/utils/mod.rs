// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Contains shared request validation helpers used by services and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

/// Field validation for request payloads and query strings
pub mod validation;
