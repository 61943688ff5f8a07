// ABOUTME: User management database operations
// ABOUTME: Handles user creation, lookup by id or email, profile updates and login bookkeeping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use chrono::Utc;
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::{normalize_email, NewUser, User};
use sqlx::{sqlite::SqliteRow, Row};

use super::{is_unique_violation, parse_timestamp, Database};

const USER_COLUMNS: &str =
    "id, email, name, password_hash, is_active, is_staff, is_superuser, created_at, last_login";

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name TEXT NOT NULL DEFAULT '',
                password_hash TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_staff INTEGER NOT NULL DEFAULT 0,
                is_superuser INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                last_login TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create users table: {e}")))?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is empty
    /// - The email is already registered (case-insensitively)
    /// - Database operation fails
    pub async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let email = normalize_email(&user.email);
        if email.is_empty() {
            return Err(AppError::missing_field("email"));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO users (email, name, password_hash, is_active, is_staff, is_superuser, created_at)
            VALUES ($1, $2, $3, 1, $4, $5, $6)
            ",
        )
        .bind(&email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("user with this email already exists.").with_field("email")
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            email,
            name: user.name.clone(),
            password_hash: user.password_hash.clone(),
            is_active: true,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: now,
            last_login: None,
        })
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Get a user by email, ignoring case
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Persist changes to an existing user's email, name, password and flags
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user does not exist
    /// - The new email belongs to another user
    /// - Database operation fails
    pub async fn update_user(&self, user: &User) -> AppResult<User> {
        let email = normalize_email(&user.email);
        if email.is_empty() {
            return Err(AppError::missing_field("email"));
        }

        let result = sqlx::query(
            r"
            UPDATE users SET
                email = $1, name = $2, password_hash = $3,
                is_active = $4, is_staff = $5, is_superuser = $6
            WHERE id = $7
            ",
        )
        .bind(&email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("user with this email already exists.").with_field("email")
            } else {
                AppError::database(format!("Failed to update user: {e}"))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }

        Ok(User {
            email,
            ..user.clone()
        })
    }

    /// Record a successful login
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn update_last_login(&self, user_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(Utc::now().to_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last login: {e}")))?;
        Ok(())
    }

    /// Delete a user and, by cascade, everything they own
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete_user(&self, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete user: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let created_at: String = row.get("created_at");
    let last_login: Option<String> = row.get("last_login");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        is_active: row.get("is_active"),
        is_staff: row.get("is_staff"),
        is_superuser: row.get("is_superuser"),
        created_at: parse_timestamp(&created_at)?,
        last_login: last_login.as_deref().map(parse_timestamp).transpose()?,
    })
}
