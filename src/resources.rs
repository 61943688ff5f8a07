// ABOUTME: Centralized resource container for dependency injection in the API server
// ABOUTME: Shares the database, auth manager, middleware and user service across handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! Shared server resources
//!
//! Built once at startup and handed to every router as `Arc<ServerResources>`.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::middleware::AuthMiddleware;
use crate::services::UserService;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// SQLite storage
    pub database: Arc<Database>,
    /// JWT issuance and password hashing
    pub auth_manager: Arc<AuthManager>,
    /// Resolves `Authorization` headers to users
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Account rules shared with the CLI
    pub user_service: Arc<UserService>,
    /// Loaded server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: Arc<ServerConfig>) -> Self {
        let database = Arc::new(database);
        let auth_middleware = Arc::new(AuthMiddleware::new(
            auth_manager.clone(),
            Arc::clone(&database),
        ));
        let user_service = Arc::new(UserService::new(
            Arc::clone(&database),
            auth_manager.clone(),
        ));

        Self {
            database,
            auth_manager: Arc::new(auth_manager),
            auth_middleware,
            user_service,
            config,
        }
    }

    /// Create resources with an `AuthManager` built from the auth configuration
    #[must_use]
    pub fn from_config(database: Database, config: Arc<ServerConfig>) -> Self {
        let auth_manager = AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
        )
        .with_bcrypt_cost(config.auth.bcrypt_cost);
        Self::new(database, auth_manager, config)
    }
}
