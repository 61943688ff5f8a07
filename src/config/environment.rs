// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! Environment-based configuration management for production deployment

use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use rand::RngCore;
use recipe_core::constants::{defaults, env_config};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};

/// bcrypt accepts work factors in this range
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;
const MAX_JWT_EXPIRY_HOURS: i64 = 8760;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (default)
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a testing environment
    #[must_use]
    pub const fn is_testing(self) -> bool {
        matches!(self, Self::Testing)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        f.write_str(name)
    }
}

/// Type-safe `SQLite` database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse `sqlite::memory:`, `sqlite:<path>` or a bare file path
    ///
    /// # Errors
    ///
    /// Returns an error for an empty string or a non-`SQLite` scheme
    pub fn parse_url(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Database URL cannot be empty");
        }

        if let Some(path_str) = s.strip_prefix("sqlite:") {
            let path_str = path_str.trim_start_matches("//");
            if path_str == ":memory:" {
                return Ok(Self::Memory);
            }
            return Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            });
        }

        if s.contains("://") {
            bail!("Unsupported database URL scheme: {s}");
        }

        // Fallback: treat as SQLite file path
        Ok(Self::SQLite {
            path: PathBuf::from(s),
        })
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(
                defaults::DATABASE_URL
                    .strip_prefix("sqlite:")
                    .unwrap_or(defaults::DATABASE_URL),
            ),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Maximum pooled connections
    pub max_connections: u32,
}

/// Token signing settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Cross-origin settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            log_level: LogLevel::default(),
            environment: Environment::default(),
            database: DatabaseConfig {
                url: DatabaseUrl::default(),
                max_connections: defaults::DATABASE_MAX_CONNECTIONS,
            },
            auth: AuthConfig {
                jwt_secret: generate_secret(),
                jwt_expiry_hours: defaults::JWT_EXPIRY_HOURS,
                bcrypt_cost: defaults::BCRYPT_COST,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(defaults::CORS_ALLOWED_ORIGINS),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed, if `JWT_SECRET` is
    /// missing in production, or if validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let environment =
            Environment::from_str_or_default(&env_var_or(env_config::ENVIRONMENT, "development"));

        let jwt_secret = match env::var(env_config::JWT_SECRET) {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment.is_production() => {
                bail!("{} must be set in production", env_config::JWT_SECRET)
            }
            _ => {
                warn!(
                    "{} not set, generating a random secret; tokens will not survive a restart",
                    env_config::JWT_SECRET
                );
                generate_secret()
            }
        };

        let config = Self {
            http_port: parse_env(env_config::HTTP_PORT, defaults::HTTP_PORT)?,
            log_level: LogLevel::from_str_or_default(&env_var_or(env_config::LOG_LEVEL, "info")),
            environment,
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or(
                    env_config::DATABASE_URL,
                    defaults::DATABASE_URL,
                ))
                .with_context(|| format!("Invalid {} value", env_config::DATABASE_URL))?,
                max_connections: parse_env(
                    env_config::DATABASE_MAX_CONNECTIONS,
                    defaults::DATABASE_MAX_CONNECTIONS,
                )?,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_env(
                    env_config::JWT_EXPIRY_HOURS,
                    defaults::JWT_EXPIRY_HOURS,
                )?,
                bcrypt_cost: parse_env(env_config::BCRYPT_COST, defaults::BCRYPT_COST)?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or(
                    env_config::CORS_ALLOWED_ORIGINS,
                    defaults::CORS_ALLOWED_ORIGINS,
                )),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error for an empty secret, zero-valued limits, or a token
    /// lifetime or bcrypt cost outside its supported range
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(anyhow!("{} cannot be empty", env_config::JWT_SECRET));
        }

        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.auth.jwt_expiry_hours) {
            return Err(anyhow!(
                "{} must be between 1 and {MAX_JWT_EXPIRY_HOURS} hours",
                env_config::JWT_EXPIRY_HOURS
            ));
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(anyhow!(
                "{} must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}",
                env_config::BCRYPT_COST
            ));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow!(
                "{} must be at least 1",
                env_config::DATABASE_MAX_CONNECTIONS
            ));
        }

        if self.cors.allowed_origins.is_empty() {
            warn!("No CORS origins configured; any origin will be allowed");
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Recipe API Server Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Max DB Connections: {}\n\
             - Token Expiry: {}h\n\
             - CORS Origins: {}",
            self.http_port,
            self.environment,
            self.log_level,
            self.database.url,
            self.database.max_connections,
            self.auth.jwt_expiry_hours,
            self.cors.allowed_origins.join(", "),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {value}")),
        Err(_) => Ok(default),
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Random hex secret for non-production runs without `JWT_SECRET`
fn generate_secret() -> String {
    let mut bytes = [0_u8; defaults::GENERATED_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
