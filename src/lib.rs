// ABOUTME: Main library entry point for the recipe API server
// ABOUTME: Exposes users, tags, ingredients and recipes over an authenticated JSON HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

#![deny(unsafe_code)]

//! # Recipe API Server
//!
//! A JSON HTTP backend where users register, obtain a token, and manage
//! their own recipes together with the tags and ingredients attached to
//! them.
//!
//! ## Architecture
//!
//! - **`recipe-core`**: error types, domain models and constants
//! - **Database**: SQLite via `sqlx`, one manager per resource
//! - **Auth**: bcrypt password hashes and HS256 JWTs
//! - **Routes**: axum routers sharing [`resources::ServerResources`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use recipe_api_server::config::ServerConfig;
//! use recipe_api_server::database::Database;
//! use recipe_api_server::resources::ServerResources;
//! use recipe_api_server::server::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ServerConfig::from_env()?);
//!     let database = Database::new(
//!         &config.database.url.to_connection_string(),
//!         config.database.max_connections,
//!     )
//!     .await?;
//!
//!     let port = config.http_port;
//!     let resources = Arc::new(ServerResources::from_config(database, config));
//!     run_server(resources, port).await
//! }
//! ```

/// Password hashing and JWT issuance/validation
pub mod auth;

/// Environment-driven server configuration
pub mod config;

/// SQLite storage for users, tags, ingredients and recipes
pub mod database;

/// Structured logging setup
pub mod logging;

/// Authentication, CORS and request tracing middleware
pub mod middleware;

/// Shared resources handed to every router
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// User account business rules
pub mod services;

/// Request validation helpers
pub mod utils;

pub use recipe_core::{constants, errors, models};
