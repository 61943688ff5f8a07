// ABOUTME: User account service handling registration, login tokens and profile updates
// ABOUTME: Validates credentials, hashes passwords and records auth events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::sync::Arc;

use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::{normalize_email, NewUser, User};
use tracing::{info, warn};

use crate::auth::AuthManager;
use crate::database::Database;
use crate::logging::AppLogger;
use crate::utils::validation::{check_max_length, require_email, require_password, require_text};

/// Message returned for every failed login so callers cannot probe accounts
const INVALID_CREDENTIALS: &str = "Unable to authenticate with provided credentials.";

/// Partial profile update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New login email, normalized before storage
    pub email: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New plaintext password, hashed before storage
    pub password: Option<String>,
}

/// User account operations shared by the HTTP routes and the CLI
#[derive(Clone)]
pub struct UserService {
    database: Arc<Database>,
    auth_manager: AuthManager,
}

impl UserService {
    /// Create a service over shared storage and auth
    #[must_use]
    pub const fn new(database: Arc<Database>, auth_manager: AuthManager) -> Self {
        Self {
            database,
            auth_manager,
        }
    }

    /// Register a regular user
    ///
    /// The name may be empty here; the public endpoint enforces a non-blank
    /// name before calling in.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The email is empty or malformed
    /// - The password is shorter than the minimum length
    /// - The email is already registered
    /// - Hashing or database operation fails
    pub async fn create_user(&self, email: &str, password: &str, name: &str) -> AppResult<User> {
        self.create(email, password, name, false).await
    }

    /// Register a staff superuser
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::create_user`]
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> AppResult<User> {
        self.create(email, password, name, true).await
    }

    async fn create(
        &self,
        email: &str,
        password: &str,
        name: &str,
        superuser: bool,
    ) -> AppResult<User> {
        let email = normalize_email(email);
        let email = require_email(Some(&email))?;
        let password = require_password(Some(password))?;
        let name = name.trim();
        check_max_length("name", name)?;

        let password_hash = self.auth_manager.hash_password(&password).await?;
        let new_user = if superuser {
            NewUser::superuser(&email, name, password_hash)
        } else {
            NewUser::regular(&email, name, password_hash)
        };

        let user = match self.database.create_user(&new_user).await {
            Ok(user) => user,
            Err(e) => {
                AppLogger::log_auth_event(&email, "register", false, Some(e.message.as_str()));
                return Err(e);
            }
        };

        AppLogger::log_auth_event(&user.email, "register", true, None);
        info!(
            user_id = user.id,
            superuser, "User registered successfully: {}", user.email
        );
        Ok(user)
    }

    /// Exchange email and password for a JWT
    ///
    /// Unknown emails, wrong passwords and inactive accounts all produce the
    /// same 400 response.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error for blank fields or bad credentials,
    /// or an internal error if hashing, token signing or the database fails
    pub async fn issue_token(&self, email: Option<&str>, password: Option<&str>) -> AppResult<String> {
        let email = require_text("email", email)?;
        let Some(password) = password.filter(|p| !p.trim().is_empty()) else {
            return Err(AppError::missing_field("password"));
        };

        let Some(user) = self.database.get_user_by_email(&email).await? else {
            AppLogger::log_auth_event(&email, "login", false, Some("unknown user"));
            return Err(AppError::invalid_input(INVALID_CREDENTIALS));
        };

        if !self
            .auth_manager
            .verify_password(password, &user.password_hash)
            .await?
        {
            AppLogger::log_auth_event(&user.email, "login", false, Some("wrong password"));
            return Err(AppError::invalid_input(INVALID_CREDENTIALS));
        }

        if !user.is_active {
            warn!(user_id = user.id, "Login blocked for inactive user");
            AppLogger::log_auth_event(&user.email, "login", false, Some("inactive"));
            return Err(AppError::invalid_input(INVALID_CREDENTIALS));
        }

        self.database.update_last_login(user.id).await?;
        let token = self.auth_manager.generate_token(&user)?;

        AppLogger::log_auth_event(&user.email, "login", true, None);
        Ok(token)
    }

    /// Apply a partial profile update to the given user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The user does not exist
    /// - A supplied field fails the same checks as registration
    /// - The new email belongs to another account
    /// - Hashing or database operation fails
    pub async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> AppResult<User> {
        let mut user = self
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if let Some(email) = &update.email {
            user.email = require_email(Some(&normalize_email(email)))?;
        }
        if let Some(name) = &update.name {
            user.name = require_text("name", Some(name))?;
        }
        if let Some(password) = &update.password {
            let password = require_password(Some(password))?;
            user.password_hash = self.auth_manager.hash_password(&password).await?;
            AppLogger::log_auth_event(&user.email, "password_change", true, None);
        }

        let user = self.database.update_user(&user).await?;
        info!(user_id = user.id, "Updated user profile");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::create_test_db;
    use recipe_core::errors::ErrorCode;

    async fn service() -> UserService {
        let database = Arc::new(create_test_db().await.unwrap());
        UserService::new(database, AuthManager::new(b"secret", 24).with_bcrypt_cost(4))
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let service = service().await;
        let user = service
            .create_user("Test@Example.com", "testpass123", "Test Name")
            .await
            .unwrap();

        assert_eq!(user.email, "test@example.com");
        assert_ne!(user.password_hash, "testpass123");
        assert!(service
            .auth_manager
            .verify_password("testpass123", &user.password_hash)
            .await
            .unwrap());
        assert!(!user.is_staff);
    }

    #[tokio::test]
    async fn test_create_user_without_email_fails() {
        let service = service().await;
        let err = service.create_user("", "testpass123", "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[tokio::test]
    async fn test_create_user_short_password_fails() {
        let service = service().await;
        let err = service
            .create_user("test@example.com", "pw", "Test")
            .await
            .unwrap_err();
        assert_eq!(err.context.field.as_deref(), Some("password"));
        assert!(service
            .database
            .get_user_by_email("test@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_superuser_sets_flags() {
        let service = service().await;
        let user = service
            .create_superuser("admin@example.com", "adminpass", "")
            .await
            .unwrap();
        assert!(user.is_staff);
        assert!(user.is_superuser);
    }

    #[tokio::test]
    async fn test_issue_token() {
        let service = service().await;
        let user = service
            .create_user("test@example.com", "testpass123", "Test")
            .await
            .unwrap();

        let token = service
            .issue_token(Some("TEST@example.com"), Some("testpass123"))
            .await
            .unwrap();
        let auth = service.auth_manager.authenticate(&token).unwrap();
        assert_eq!(auth.user_id, user.id);

        let stored = service.database.get_user(user.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_issue_token_rejections() {
        let service = service().await;
        service
            .create_user("test@example.com", "goodpass", "Test")
            .await
            .unwrap();

        let wrong = service
            .issue_token(Some("test@example.com"), Some("badpass"))
            .await
            .unwrap_err();
        assert_eq!(wrong.http_status(), 400);

        let unknown = service
            .issue_token(Some("nobody@example.com"), Some("goodpass"))
            .await
            .unwrap_err();
        assert_eq!(unknown.http_status(), 400);

        let blank = service
            .issue_token(Some("test@example.com"), Some(""))
            .await
            .unwrap_err();
        assert_eq!(blank.code, ErrorCode::MissingRequiredField);
    }

    #[tokio::test]
    async fn test_issue_token_inactive_user() {
        let service = service().await;
        let mut user = service
            .create_user("test@example.com", "goodpass", "Test")
            .await
            .unwrap();
        user.is_active = false;
        service.database.update_user(&user).await.unwrap();

        let err = service
            .issue_token(Some("test@example.com"), Some("goodpass"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = service().await;
        let user = service
            .create_user("test@example.com", "oldpass", "Old Name")
            .await
            .unwrap();

        let update = ProfileUpdate {
            name: Some("New Name".to_owned()),
            password: Some("newpassword".to_owned()),
            ..ProfileUpdate::default()
        };
        let updated = service.update_profile(user.id, &update).await.unwrap();

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.email, "test@example.com");
        assert!(service
            .auth_manager
            .verify_password("newpassword", &updated.password_hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_email() {
        let service = service().await;
        service
            .create_user("first@example.com", "password", "First")
            .await
            .unwrap();
        let second = service
            .create_user("second@example.com", "password", "Second")
            .await
            .unwrap();

        let update = ProfileUpdate {
            email: Some("FIRST@example.com".to_owned()),
            ..ProfileUpdate::default()
        };
        let err = service.update_profile(second.id, &update).await.unwrap_err();
        assert_eq!(err.http_status(), 400);
    }
}
