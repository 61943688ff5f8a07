// ABOUTME: Configuration module for centralized server settings
// ABOUTME: Re-exports the environment-driven ServerConfig and its parts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! Configuration for the recipe API server
//!
//! All settings come from environment variables; there is no config file.

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DatabaseConfig, DatabaseUrl, Environment, LogLevel, ServerConfig,
};
