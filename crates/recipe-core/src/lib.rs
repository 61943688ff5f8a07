// ABOUTME: Foundation crate for the recipe API server
// ABOUTME: Error types, domain models and shared constants with no server dependencies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

#![deny(unsafe_code)]

//! # Recipe Core
//!
//! Types shared by every layer of the recipe API server. HTTP and database
//! integrations of [`errors::AppError`] sit behind the `http-response` and
//! `database-errors` features so this crate stays light for consumers that
//! only need the models.

/// Application constants: limits, defaults, environment variable names, routes
pub mod constants;

/// Unified error handling
pub mod errors;

/// Domain models
pub mod models;
