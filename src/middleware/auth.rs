// ABOUTME: Request authentication middleware resolving Authorization headers to users
// ABOUTME: Accepts Bearer and Token schemes, validates the JWT and loads the active user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::User;
use tracing::{debug, field::Empty, info, warn, Span};

use crate::auth::AuthManager;
use crate::database::Database;
use crate::logging::AppLogger;
use crate::resources::ServerResources;

/// Authorization schemes accepted in front of the token
const TOKEN_SCHEMES: [&str; 2] = ["Bearer ", "Token "];

/// Middleware for API request authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: AuthManager,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: AuthManager, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns an authentication error if:
    /// - The header is missing or uses an unknown scheme
    /// - The token is expired, malformed or signed with another key
    /// - The user no longer exists or is inactive
    ///
    /// Database failures are returned as internal errors.
    #[tracing::instrument(
        skip(self, auth_header),
        fields(auth_method = Empty, user_id = Empty, success = Empty)
    )]
    pub async fn authenticate_request(&self, auth_header: Option<&str>) -> AppResult<User> {
        let Some(header) = auth_header else {
            warn!("Authentication failed: Missing authorization header");
            Span::current().record("success", false);
            return Err(AppError::auth_required());
        };

        let Some((scheme, token)) = TOKEN_SCHEMES.iter().find_map(|scheme| {
            header
                .strip_prefix(scheme)
                .map(|token| (scheme.trim_end(), token.trim()))
        }) else {
            Span::current()
                .record("auth_method", "INVALID")
                .record("success", false);
            warn!("Authentication failed: Invalid authorization header format");
            return Err(AppError::auth_invalid(
                "Invalid authorization header format - must be 'Bearer <token>' or 'Token <token>'",
            ));
        };
        Span::current().record("auth_method", scheme);
        debug!("Attempting JWT token authentication");

        match self.authenticate_token(token).await {
            Ok(user) => {
                Span::current()
                    .record("user_id", user.id)
                    .record("success", true);
                info!("Authentication successful for user: {}", user.id);
                Ok(user)
            }
            Err(e) => {
                Span::current().record("success", false);
                warn!("JWT authentication failed: {}", e);
                Err(e)
            }
        }
    }

    async fn authenticate_token(&self, token: &str) -> AppResult<User> {
        let claims = self.auth_manager.authenticate(token)?;

        let user = self
            .database
            .get_user(claims.user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User not found"))?;

        if !user.is_active {
            AppLogger::log_security_event(
                "inactive_user_token",
                "Token presented for inactive account",
                Some(user.id),
            );
            return Err(AppError::auth_invalid("User inactive or deleted."));
        }

        Ok(user)
    }
}

/// Caller resolved by [`require_authentication`]
///
/// Handlers behind that layer read it with `Extension<AuthenticatedUser>`.
#[derive(Clone)]
pub struct AuthenticatedUser(pub User);

/// Reject requests without a valid token before any handler extractor runs
///
/// Applied with `route_layer` so that a bad body or path on a protected
/// route still answers 401 to an anonymous caller.
///
/// # Example
///
/// ```rust,no_run
/// use axum::{middleware, routing::get, Router};
/// use recipe_api_server::middleware::auth::require_authentication;
/// use recipe_api_server::resources::ServerResources;
/// use std::sync::Arc;
///
/// # async fn handler() -> &'static str { "" }
/// # fn example(resources: Arc<ServerResources>) {
/// let app: Router<Arc<ServerResources>> = Router::new()
///     .route("/", get(handler))
///     .route_layer(middleware::from_fn_with_state(resources.clone(), require_authentication));
/// # }
/// ```
pub async fn require_authentication(
    State(resources): State<Arc<ServerResources>>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let outcome = resources
        .auth_middleware
        .authenticate_request(auth_header)
        .await;

    match outcome {
        Ok(user) => {
            req.extensions_mut().insert(AuthenticatedUser(user));
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::create_test_db;
    use recipe_core::errors::ErrorCode;
    use recipe_core::models::NewUser;

    async fn setup() -> (AuthMiddleware, AuthManager, User) {
        let database = Arc::new(create_test_db().await.unwrap());
        let user = database
            .create_user(&NewUser::regular("test@example.com", "Test", "hash".to_owned()))
            .await
            .unwrap();
        let auth_manager = AuthManager::new(b"test-secret", 24).with_bcrypt_cost(4);
        (
            AuthMiddleware::new(auth_manager.clone(), database),
            auth_manager,
            user,
        )
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let (middleware, _, _) = setup().await;
        let err = middleware.authenticate_request(None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }

    #[tokio::test]
    async fn test_bearer_and_token_schemes_accepted() {
        let (middleware, auth_manager, user) = setup().await;
        let token = auth_manager.generate_token(&user).unwrap();

        let bearer = middleware
            .authenticate_request(Some(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(bearer.id, user.id);

        let legacy = middleware
            .authenticate_request(Some(&format!("Token {token}")))
            .await
            .unwrap();
        assert_eq!(legacy.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_unknown_scheme_rejected() {
        let (middleware, auth_manager, user) = setup().await;
        let token = auth_manager.generate_token(&user).unwrap();
        let err = middleware
            .authenticate_request(Some(&format!("Basic {token}")))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[tokio::test]
    async fn test_inactive_user_rejected() {
        let (middleware, auth_manager, mut user) = setup().await;
        let token = auth_manager.generate_token(&user).unwrap();

        user.is_active = false;
        middleware.database.update_user(&user).await.unwrap();

        let err = middleware
            .authenticate_request(Some(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_rejected() {
        let (middleware, auth_manager, user) = setup().await;
        let token = auth_manager.generate_token(&user).unwrap();
        middleware.database.delete_user(user.id).await.unwrap();

        let err = middleware
            .authenticate_request(Some(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 401);
    }
}
