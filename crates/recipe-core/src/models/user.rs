// ABOUTME: User model keyed by email with staff and superuser flags
// ABOUTME: Also provides email normalization shared by registration and login
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Normalize an email address so that case variants map to one identity
///
/// The whole address is trimmed and lower-cased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A registered user
#[derive(Clone, Serialize)]
pub struct User {
    /// Primary key
    pub id: i64,
    /// Normalized, unique email address (login identifier)
    pub email: String,
    /// Display name
    pub name: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Inactive users cannot obtain or use tokens
    pub is_active: bool,
    /// Staff flag
    pub is_staff: bool,
    /// Superuser flag
    pub is_superuser: bool,
    /// Registration time
    pub created_at: DateTime<Utc>,
    /// Last successful token issuance
    pub last_login: Option<DateTime<Utc>>,
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .field("is_staff", &self.is_staff)
            .field("is_superuser", &self.is_superuser)
            .field("created_at", &self.created_at)
            .field("last_login", &self.last_login)
            .finish()
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.email)
    }
}

/// Values needed to insert a user row
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Normalized email
    pub email: String,
    /// Display name (may be empty)
    pub name: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Staff flag
    pub is_staff: bool,
    /// Superuser flag
    pub is_superuser: bool,
}

impl NewUser {
    /// A regular, non-staff user
    #[must_use]
    pub fn regular(email: &str, name: impl Into<String>, password_hash: String) -> Self {
        Self {
            email: normalize_email(email),
            name: name.into(),
            password_hash,
            is_staff: false,
            is_superuser: false,
        }
    }

    /// A user with both the staff and superuser flags set
    #[must_use]
    pub fn superuser(email: &str, name: impl Into<String>, password_hash: String) -> Self {
        Self {
            is_staff: true,
            is_superuser: true,
            ..Self::regular(email, name, password_hash)
        }
    }
}
