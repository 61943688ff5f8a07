// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Validation limits, configuration defaults, and route paths for the recipe API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! Constants grouped by domain.

/// Field validation limits
pub mod limits {
    /// Minimum password length accepted at registration and profile update
    pub const MIN_PASSWORD_LENGTH: usize = 5;
    /// Maximum length of email, user name, tag/ingredient name, recipe title and link
    pub const MAX_NAME_LENGTH: usize = 255;
    /// Total significant digits allowed in a recipe price
    pub const PRICE_MAX_DIGITS: u32 = 5;
    /// Digits after the decimal point allowed in a recipe price
    pub const PRICE_DECIMAL_PLACES: u32 = 2;
}

/// Defaults used when the environment does not override them
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8000;
    /// Default `SQLite` database location
    pub const DATABASE_URL: &str = "sqlite:./data/recipes.db";
    /// Default maximum pooled database connections
    pub const DATABASE_MAX_CONNECTIONS: u32 = 5;
    /// Default token lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 24;
    /// Default CORS origin list
    pub const CORS_ALLOWED_ORIGINS: &str = "*";
    /// Length in bytes of a generated development JWT secret
    pub const GENERATED_SECRET_BYTES: usize = 64;
    /// bcrypt work factor for password hashes
    pub const BCRYPT_COST: u32 = 12;
}

/// Environment variable names
pub mod env_config {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Database connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Pool size
    pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
    /// HMAC secret for token signing
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// Token lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// Log level
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Comma-separated CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// bcrypt work factor
    pub const BCRYPT_COST: &str = "BCRYPT_COST";
}

/// Service identity used in logs and token audience
pub mod service_names {
    /// Service name
    pub const RECIPE_API_SERVER: &str = "recipe-api-server";
    /// JWT audience claim
    pub const JWT_AUDIENCE: &str = "recipe-api";
}

/// HTTP route paths
pub mod endpoints {
    /// Liveness probe
    pub const HEALTH: &str = "/health";
    /// Readiness probe
    pub const READY: &str = "/ready";
    /// Public registration
    pub const USER_CREATE: &str = "/api/user/create/";
    /// Token issuance
    pub const USER_TOKEN: &str = "/api/user/token/";
    /// Authenticated profile
    pub const USER_ME: &str = "/api/user/me/";
    /// Tag collection
    pub const TAGS: &str = "/api/recipe/tag/";
    /// Ingredient collection
    pub const INGREDIENTS: &str = "/api/recipe/ingredients/";
    /// Recipe collection
    pub const RECIPES: &str = "/api/recipe/recipes/";
}
