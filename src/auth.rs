// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Issues and validates HS256 tokens and runs bcrypt off the async executor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! # Authentication
//!
//! Tokens are stateless HS256 JWTs whose `sub` claim is the user id. They are
//! presented as `Authorization: Bearer <token>` (or `Token <token>`) on every
//! protected request. Passwords are stored as bcrypt hashes; hashing and
//! verification run on tokio's blocking pool.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use recipe_core::constants::service_names;
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::User;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task;
use tracing::{debug, warn};

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, Error)]
pub enum JwtValidationError {
    /// Token has expired
    #[error("JWT token expired at {}", .expired_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature or claims are invalid
    #[error("JWT token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    #[error("JWT token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            JwtValidationError::TokenInvalid { .. } => Self::auth_invalid(error.to_string()),
            JwtValidationError::TokenMalformed { .. } => Self::auth_malformed(error.to_string()),
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email at issuance
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// Identity extracted from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: i64,
    /// Email carried in the token
    pub email: String,
}

/// Authentication manager for `JWT` tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a new authentication manager signing with `secret`
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor
    #[must_use]
    pub const fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Generate a `JWT` token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the configured lifetime overflows the clock or
    /// JWT encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = Duration::try_hours(self.token_expiry_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Token lifetime of {} hours is out of range",
                    self.token_expiry_hours
                ))
            })?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: service_names::JWT_AUDIENCE.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is malformed, carries a
    /// bad signature or audience, or has expired
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below so the error can carry the expiry time
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        validation.set_audience(&[service_names::JWT_AUDIENCE]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| convert_jwt_error(&e))?;

        let now = Utc::now();
        if now.timestamp() >= claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(now);
            warn!(user_id = %claims.sub, expired_at = %expired_at.to_rfc3339(), "JWT token expired");
            return Err(JwtValidationError::TokenExpired { expired_at });
        }

        debug!(user_id = %claims.sub, "JWT token validated");
        Ok(claims)
    }

    /// Validate a token and extract the caller's identity
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if validation fails or the subject is
    /// not a user id
    pub fn authenticate(&self, token: &str) -> Result<AuthResult, JwtValidationError> {
        let claims = self.validate_token(token)?;
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| JwtValidationError::TokenInvalid {
                reason: format!("Invalid user ID in token: {}", claims.sub),
            })?;

        Ok(AuthResult {
            user_id,
            email: claims.email,
        })
    }

    /// Hash a password with bcrypt on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the blocking task panics
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing error: {e}")))
    }

    /// Check a password against a stored bcrypt hash on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is unreadable or the blocking task panics
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password verification error: {e}")))
    }
}

/// Convert JWT library errors to detailed validation errors
fn convert_jwt_error(e: &JwtError) -> JwtValidationError {
    warn!("JWT token validation failed: {e:?}");

    match e.kind() {
        ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
            reason: "Token signature verification failed".into(),
        },
        ErrorKind::InvalidAudience => JwtValidationError::TokenInvalid {
            reason: "Token audience mismatch".into(),
        },
        ErrorKind::MissingRequiredClaim(claim) => JwtValidationError::TokenInvalid {
            reason: format!("Token missing required claim: {claim}"),
        },
        ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
            details: "Token format is invalid".into(),
        },
        ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
            details: format!("Token contains invalid base64: {base64_err}"),
        },
        ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
            details: format!("Token contains invalid JSON: {json_err}"),
        },
        ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
            details: format!("Token contains invalid UTF-8: {utf8_err}"),
        },
        _ => JwtValidationError::TokenInvalid {
            reason: format!("Token validation failed: {e}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_core::errors::ErrorCode;

    fn test_user() -> User {
        User {
            id: 42,
            email: "test@example.com".to_owned(),
            name: "Test".to_owned(),
            password_hash: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    fn manager() -> AuthManager {
        AuthManager::new(b"test_secret_key_for_unit_tests", 24).with_bcrypt_cost(4)
    }

    #[test]
    fn test_token_round_trip() {
        let auth = manager();
        let token = auth.generate_token(&test_user()).unwrap();

        let result = auth.authenticate(&token).unwrap();
        assert_eq!(result.user_id, 42);
        assert_eq!(result.email, "test@example.com");
    }

    #[test]
    fn test_oversized_lifetime_is_an_error() {
        let auth = AuthManager::new(b"test_secret_key_for_unit_tests", i64::MAX / 2);
        let err = auth.generate_token(&test_user()).unwrap_err();
        assert!(err.code.is_server_error());
    }

    #[test]
    fn test_token_from_other_secret_is_invalid() {
        let token = AuthManager::new(b"another_secret", 24)
            .generate_token(&test_user())
            .unwrap();

        let err = manager().validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenInvalid { .. }));
        assert_eq!(AppError::from(err).code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_expired_token() {
        let expired = AuthManager::new(b"test_secret_key_for_unit_tests", -1)
            .generate_token(&test_user())
            .unwrap();

        let err = manager().validate_token(&expired).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenExpired { .. }));
        assert_eq!(AppError::from(err).code, ErrorCode::AuthExpired);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let err = manager().validate_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenMalformed { .. }));
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let auth = manager();
        let hash = auth.hash_password("testpass123").await.unwrap();

        assert_ne!(hash, "testpass123");
        assert!(auth.verify_password("testpass123", &hash).await.unwrap());
        assert!(!auth.verify_password("wrong", &hash).await.unwrap());
    }
}
