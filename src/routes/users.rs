// ABOUTME: User route handlers for registration, token issuance and the caller's profile
// ABOUTME: Thin axum handlers delegating account rules to UserService
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! User routes
//!
//! Registration and token issuance are public. The `me` endpoint requires a
//! token and only supports reads and updates.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use recipe_core::constants::endpoints;
use recipe_core::errors::{AppError, ErrorCode};
use recipe_core::models::User;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::middleware::{require_authentication, AuthenticatedUser};
use crate::resources::ServerResources;
use crate::services::ProfileUpdate;
use crate::utils::validation::require_text;

/// Registration payload; fields are optional so missing ones map to field errors
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    /// Login email
    pub email: Option<String>,
    /// Plaintext password
    pub password: Option<String>,
    /// Display name
    pub name: Option<String>,
}

/// Login payload
#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    /// Login email
    pub email: Option<String>,
    /// Plaintext password
    pub password: Option<String>,
}

/// Profile update payload used by both PUT and PATCH
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// New login email
    pub email: Option<String>,
    /// New display name
    pub name: Option<String>,
    /// New plaintext password
    pub password: Option<String>,
}

/// Public view of a user; the password is write-only
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

/// Issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed JWT
    pub token: String,
}

/// User routes handler
pub struct UserRoutes;

impl UserRoutes {
    /// Create all user routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let profile = Router::new()
            .route(
                endpoints::USER_ME,
                get(Self::handle_me)
                    .put(Self::handle_update)
                    .patch(Self::handle_partial_update)
                    .post(|| async { Self::method_not_allowed() }),
            )
            .route_layer(middleware::from_fn_with_state(
                resources.clone(),
                require_authentication,
            ));

        Router::new()
            .route(endpoints::USER_CREATE, post(Self::handle_create))
            .route(endpoints::USER_TOKEN, post(Self::handle_token))
            .merge(profile)
            .with_state(resources)
    }

    /// Handle POST /api/user/create/ - Register a new user
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        WithRejection(Json(body), _): WithRejection<Json<CreateUserRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let email = require_text("email", body.email.as_deref())?;
        let Some(password) = body.password else {
            return Err(AppError::missing_field("password"));
        };
        let name = require_text("name", body.name.as_deref())?;

        let user = resources
            .user_service
            .create_user(&email, &password, &name)
            .await?;

        let response: UserResponse = user.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/user/token/ - Exchange credentials for a token
    async fn handle_token(
        State(resources): State<Arc<ServerResources>>,
        WithRejection(Json(body), _): WithRejection<Json<TokenRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let token = resources
            .user_service
            .issue_token(body.email.as_deref(), body.password.as_deref())
            .await?;

        Ok((StatusCode::OK, Json(TokenResponse { token })).into_response())
    }

    /// Handle GET /api/user/me/ - Return the authenticated user
    #[allow(clippy::unused_async)]
    async fn handle_me(
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    ) -> Json<UserResponse> {
        Json(user.into())
    }

    /// Handle PUT /api/user/me/ - Replace email, name and password
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Json(body), _): WithRejection<Json<UpdateUserRequest>, AppError>,
    ) -> Result<Response, AppError> {
        for (field, value) in [
            ("email", &body.email),
            ("name", &body.name),
            ("password", &body.password),
        ] {
            if value.is_none() {
                return Err(AppError::missing_field(field));
            }
        }

        let update = ProfileUpdate {
            email: body.email,
            name: body.name,
            password: body.password,
        };
        let user = resources.user_service.update_profile(user.id, &update).await?;

        info!(user_id = user.id, "Replaced user profile");
        let response: UserResponse = user.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PATCH /api/user/me/ - Update the supplied fields only
    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Json(body), _): WithRejection<Json<UpdateUserRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let update = ProfileUpdate {
            email: body.email,
            name: body.name,
            password: body.password,
        };
        let user = resources.user_service.update_profile(user.id, &update).await?;

        let response: UserResponse = user.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// POST /api/user/me/ - Not supported; only reached once authenticated
    fn method_not_allowed() -> AppError {
        AppError::new(ErrorCode::MethodNotAllowed, "Method \"POST\" not allowed.")
    }
}
