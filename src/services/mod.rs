// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Keeps user account rules in one place for the HTTP routes and the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! Domain service layer
//!
//! Route handlers and binaries call into these services so account rules are
//! applied the same way regardless of the entry point.

/// User accounts: registration, token issuance, profile updates
pub mod users;

pub use users::{ProfileUpdate, UserService};
