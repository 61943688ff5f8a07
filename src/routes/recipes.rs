// ABOUTME: Route handlers for recipes owned by the authenticated user
// ABOUTME: List with tag/ingredient filters, create, detail, full and partial update, delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! Recipe routes
//!
//! List and create responses carry tag and ingredient ids. The detail
//! endpoints expand them into `{id, name}` objects and include the image.

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
use recipe_core::constants::endpoints;
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::{Price, Recipe, RecipeDetail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::AttributeResponse;
use crate::database::{RecipeFilter, RecipeInput, RecipePatch, RecipesManager};
use crate::middleware::{require_authentication, AuthenticatedUser};
use crate::resources::ServerResources;
use crate::utils::validation::{
    check_max_length, check_non_negative, parse_id_list, parse_price, require_text,
};

/// Query parameters for recipe listing, e.g. `?tags=1,2&ingredients=3`
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    /// Comma-separated tag ids
    pub tags: Option<String>,
    /// Comma-separated ingredient ids
    pub ingredients: Option<String>,
}

/// Create/update payload; every field optional so PATCH can reuse it
#[derive(Debug, Default, Deserialize)]
pub struct RecipeRequest {
    /// Recipe title
    pub title: Option<String>,
    /// Preparation time in minutes
    pub time_minutes: Option<i32>,
    /// Price with at most two decimals, as a number or numeric string
    pub price: Option<Value>,
    /// Optional source link
    pub link: Option<String>,
    /// Tag ids owned by the caller
    pub tags: Option<Vec<i64>>,
    /// Ingredient ids owned by the caller
    pub ingredients: Option<Vec<i64>>,
}

impl RecipeRequest {
    /// Validate a full payload; link, tags and ingredients default to empty
    fn into_input(self) -> AppResult<RecipeInput> {
        let title = require_text("title", self.title.as_deref())?;
        let time_minutes = check_non_negative(
            "time_minutes",
            self.time_minutes
                .ok_or_else(|| AppError::missing_field("time_minutes"))?,
        )?;
        let price = parse_price(
            self.price
                .as_ref()
                .ok_or_else(|| AppError::missing_field("price"))?,
        )?;
        let link = normalize_link(self.link)?;

        Ok(RecipeInput {
            title,
            time_minutes,
            price,
            link,
            tags: self.tags.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
        })
    }

    /// Validate only the fields that are present
    fn into_patch(self) -> AppResult<RecipePatch> {
        let title = self
            .title
            .map(|title| require_text("title", Some(&title)))
            .transpose()?;
        let time_minutes = self
            .time_minutes
            .map(|minutes| check_non_negative("time_minutes", minutes))
            .transpose()?;
        let price = self.price.as_ref().map(parse_price).transpose()?;
        let link = self
            .link
            .map(|link| normalize_link(Some(link)))
            .transpose()?;

        Ok(RecipePatch {
            title,
            time_minutes,
            price,
            link,
            tags: self.tags,
            ingredients: self.ingredients,
        })
    }
}

fn normalize_link(link: Option<String>) -> AppResult<String> {
    let link = link.map(|l| l.trim().to_owned()).unwrap_or_default();
    check_max_length("link", &link)?;
    Ok(link)
}

/// List/create wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeResponse {
    /// Primary key
    pub id: i64,
    /// Recipe title
    pub title: String,
    /// Preparation time in minutes
    pub time_minutes: i32,
    /// Price rendered with two decimals
    pub price: Price,
    /// External link, empty when unset
    pub link: String,
    /// Linked tag ids, ascending
    pub tags: Vec<i64>,
    /// Linked ingredient ids, ascending
    pub ingredients: Vec<i64>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: recipe.tag_ids,
            ingredients: recipe.ingredient_ids,
        }
    }
}

/// Detail wire shape with expanded attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetailResponse {
    /// Primary key
    pub id: i64,
    /// Recipe title
    pub title: String,
    /// Preparation time in minutes
    pub time_minutes: i32,
    /// Price rendered with two decimals
    pub price: Price,
    /// External link, empty when unset
    pub link: String,
    /// Stored image reference
    pub image: Option<String>,
    /// Linked tags
    pub tags: Vec<AttributeResponse>,
    /// Linked ingredients
    pub ingredients: Vec<AttributeResponse>,
}

impl From<RecipeDetail> for RecipeDetailResponse {
    fn from(detail: RecipeDetail) -> Self {
        let RecipeDetail {
            recipe,
            tags,
            ingredients,
        } = detail;
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            image: recipe.image,
            tags: tags.iter().map(AttributeResponse::from_attribute).collect(),
            ingredients: ingredients
                .iter()
                .map(AttributeResponse::from_attribute)
                .collect(),
        }
    }
}

/// Recipe routes handler
pub struct RecipeRoutes;

impl RecipeRoutes {
    /// Create all recipe routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let detail_path = format!("{}:id/", endpoints::RECIPES);
        Router::new()
            .route(
                endpoints::RECIPES,
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

    fn manager(resources: &ServerResources) -> RecipesManager {
        resources.database.recipes()
    }

    fn not_found(id: i64) -> AppError {
        AppError::not_found(format!("Recipe {id}"))
    }

    async fn detail_response(
        resources: &ServerResources,
        user_id: i64,
        id: i64,
    ) -> Result<Response, AppError> {
        let detail = Self::manager(resources)
            .get_detail(user_id, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        let response: RecipeDetailResponse = detail.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/recipe/recipes/ - List the caller's recipes
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Query(query), _): WithRejection<Query<ListRecipesQuery>, AppError>,
    ) -> Result<Response, AppError> {
        let filter = RecipeFilter {
            tags: parse_id_list("tags", query.tags.as_deref())?,
            ingredients: parse_id_list("ingredients", query.ingredients.as_deref())?,
        };

        let recipes = Self::manager(&resources).list(user.id, &filter).await?;

        let response: Vec<RecipeResponse> = recipes.into_iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/recipe/recipes/ - Create a recipe
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Json(body), _): WithRejection<Json<RecipeRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let input = body.into_input()?;

        let recipe = Self::manager(&resources).create(user.id, &input).await?;

        info!(user_id = user.id, recipe_id = recipe.id, "Created recipe");
        let response: RecipeResponse = recipe.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/recipe/recipes/:id/ - Recipe detail
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    ) -> Result<Response, AppError> {
        Self::detail_response(&resources, user.id, id).await
    }

    /// Handle PUT /api/recipe/recipes/:id/ - Replace a recipe
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
        WithRejection(Json(body), _): WithRejection<Json<RecipeRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let input = body.into_input()?;

        Self::manager(&resources)
            .update(user.id, id, &input)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        info!(user_id = user.id, recipe_id = id, "Replaced recipe");
        Self::detail_response(&resources, user.id, id).await
    }

    /// Handle PATCH /api/recipe/recipes/:id/ - Update supplied fields
    async fn handle_partial_update(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
        WithRejection(Json(body), _): WithRejection<Json<RecipeRequest>, AppError>,
    ) -> Result<Response, AppError> {
        let patch = body.into_patch()?;

        Self::manager(&resources)
            .patch(user.id, id, &patch)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        Self::detail_response(&resources, user.id, id).await
    }

    /// Handle DELETE /api/recipe/recipes/:id/ - Delete a recipe
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
        WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    ) -> Result<Response, AppError> {
        if !Self::manager(&resources).delete(user.id, id).await? {
            return Err(Self::not_found(id));
        }

        info!(user_id = user.id, recipe_id = id, "Deleted recipe");
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
