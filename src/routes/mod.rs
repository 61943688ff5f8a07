// ABOUTME: Route module organization for the recipe API HTTP endpoints
// ABOUTME: Groups routers by domain; protected routers share the authentication layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! HTTP routes
//!
//! Each domain module holds its route table and thin handlers that delegate
//! to the database managers and services.

/// Tag and ingredient routes
pub mod attributes;
/// Health check and readiness routes
pub mod health;
/// Recipe routes
pub mod recipes;
/// User registration, token and profile routes
pub mod users;

pub use attributes::{AttributeResponse, AttributeRoutes};
pub use health::HealthRoutes;
pub use recipes::RecipeRoutes;
pub use users::UserRoutes;
