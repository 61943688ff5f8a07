// ABOUTME: SQLite database access: connection pool, schema migrations and per-table managers
// ABOUTME: Users live on Database itself; tags, ingredients and recipes have dedicated managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! # Database Management
//!
//! [`Database`] owns the `SQLite` pool and creates the schema idempotently at
//! startup. Every query that touches tags, ingredients or recipes is scoped by
//! the owning `user_id`; a row owned by someone else behaves exactly like a
//! row that does not exist.

mod attributes;
mod recipes;
mod users;

pub use attributes::AttributesManager;
pub use recipes::{RecipeFilter, RecipeInput, RecipePatch, RecipesManager};

use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::{Ingredient, Tag};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Database manager for users, tags, ingredients and recipes
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `database_url` and run migrations
    ///
    /// In-memory databases are pinned to a single connection so every query
    /// sees the same schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or a
    /// migration fails
    pub async fn new(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let is_memory = database_url.contains(":memory:");
        if !is_memory {
            ensure_parent_dir(database_url)?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL {database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        info!(database_url, "Database initialized");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Tag storage
    #[must_use]
    pub fn tags(&self) -> AttributesManager<Tag> {
        AttributesManager::new(self.pool.clone())
    }

    /// Ingredient storage
    #[must_use]
    pub fn ingredients(&self) -> AttributesManager<Ingredient> {
        AttributesManager::new(self.pool.clone())
    }

    /// Recipe storage
    #[must_use]
    pub fn recipes(&self) -> RecipesManager {
        RecipesManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any `CREATE TABLE`/`CREATE INDEX` statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.tags().migrate().await?;
        self.ingredients().migrate().await?;
        self.recipes().migrate().await?;

        debug!("Database migrations complete");
        Ok(())
    }

    /// Cheap round trip used by the readiness probe
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database health check failed: {e}")))?;
        Ok(())
    }
}

/// Create the directory holding a file-backed database
fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path_str = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path_str = path_str.split('?').next().unwrap_or(path_str);

    if let Some(parent) = Path::new(path_str).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))
}

/// True when a sqlx error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::Database;
    use recipe_core::errors::AppResult;

    pub(crate) async fn create_test_db() -> AppResult<Database> {
        Database::new("sqlite::memory:", 1).await
    }
}
