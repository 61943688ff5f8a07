// ABOUTME: Route handlers for tags and ingredients, generic over RecipeAttribute
// ABOUTME: List, create, retrieve, update and delete rows owned by the authenticated user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::RecipeAttribute;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::AttributesManager;
use crate::middleware::{require_authentication, AuthenticatedUser};
use crate::resources::ServerResources;
use crate::utils::validation::{parse_flag, require_text};

/// Query parameters for attribute listing
#[derive(Debug, Default, Deserialize)]
pub struct ListAttributesQuery {
    /// `1` restricts the list to attributes used by at least one recipe
    pub assigned_only: Option<String>,
}

/// Create/update payload
#[derive(Debug, Default, Deserialize)]
pub struct AttributeRequest {
    /// Display name
    pub name: Option<String>,
}

/// Wire shape of a tag or ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeResponse {
    /// Primary key
    pub id: i64,
    /// Display name
    pub name: String,
}

impl AttributeResponse {
    /// Project a tag or ingredient onto its wire shape
    #[must_use]
    pub fn from_attribute<T: RecipeAttribute>(attribute: &T) -> Self {
        Self {
            id: attribute.id(),
            name: attribute.name().to_owned(),
        }
    }
}

/// Routes for one attribute kind mounted under `base_path`
pub struct AttributeRoutes<T> {
    _attribute: PhantomData<fn() -> T>,
}

impl<T: RecipeAttribute> AttributeRoutes<T> {
    /// Create the collection and detail routes under `base_path`
    ///
    /// `base_path` must end with `/`.
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>, base_path: &str) -> Router {
        let detail_path = format!("{base_path}:id/");
        Router::new()
            .route(
                base_path,
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                &detail_path,
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .patch(Self::handle_partial_update)
                    .delete(Self::handle_delete),
            )
            .route_layer(middleware::from_fn_with_state(
                resources.clone(),
                require_authentication,
            ))
            .with_state(resources)
    }

    fn manager(resources: &ServerResources) -> AttributesManager<T> {
        AttributesManager::new(resources.database.pool().clone())
    }

    fn not_found(id: i64) -> AppError {
        AppError::not_found(format!("{} {id}", T::LABEL))
    }

    /// Handle GET - List the caller's attributes
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Query(query), _): WithRejection<Query<ListAttributesQuery>, AppError>,
    ) -> Result<Response, AppError> {
        let assigned_only = parse_flag("assigned_only", query.assigned_only.as_deref())?;

        let attributes = Self::manager(&resources)
            .list(user.id, assigned_only)
            .await?;

        let response: Vec<AttributeResponse> = attributes
            .iter()
            .map(AttributeResponse::from_attribute)
            .collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST - Create an attribute for the caller
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Json(body), _): WithRejection<Json<AttributeRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let name = require_text("name", body.name.as_deref())?;

        let attribute = Self::manager(&resources).create(user.id, &name).await?;

        info!(
            user_id = user.id,
            id = attribute.id(),
            "Created {}",
            T::LABEL
        );
        Ok((
            StatusCode::CREATED,
            Json(AttributeResponse::from_attribute(&attribute)),
        )
            .into_response())
    }

    /// Handle GET :id - Retrieve one attribute
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    ) -> Result<Response, AppError> {
        let attribute = Self::manager(&resources)
            .get(user.id, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        Ok((
            StatusCode::OK,
            Json(AttributeResponse::from_attribute(&attribute)),
        )
            .into_response())
    }

    /// Handle PUT :id - Rename an attribute
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
        WithRejection(Json(body), _): WithRejection<Json<AttributeRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let name = require_text("name", body.name.as_deref())?;

        let attribute = Self::rename(&resources, user.id, id, &name).await?;
        Ok((
            StatusCode::OK,
            Json(AttributeResponse::from_attribute(&attribute)),
        )
            .into_response())
    }

    /// Handle PATCH :id - Rename if a name is supplied
    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
        WithRejection(Json(body), _): WithRejection<Json<AttributeRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let manager = Self::manager(&resources);

        let attribute = match body.name.as_deref() {
            Some(name) => {
                let name = require_text("name", Some(name))?;
                Self::rename(&resources, user.id, id, &name).await?
            }
            None => manager
                .get(user.id, id)
                .await?
                .ok_or_else(|| Self::not_found(id))?,
        };

        Ok((
            StatusCode::OK,
            Json(AttributeResponse::from_attribute(&attribute)),
        )
            .into_response())
    }

    /// Handle DELETE :id - Remove an attribute and its recipe links
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    ) -> Result<Response, AppError> {
        if !Self::manager(&resources).delete(user.id, id).await? {
            return Err(Self::not_found(id));
        }

        info!(user_id = user.id, id, "Deleted {}", T::LABEL);
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    async fn rename(
        resources: &ServerResources,
        user_id: i64,
        id: i64,
        name: &str,
    ) -> AppResult<T> {
        Self::manager(resources)
            .update(user_id, id, name)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }
}
