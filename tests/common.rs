// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory server resources, quiet logging and authenticated users
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `recipe_api_server`

use std::env;
use std::sync::{Arc, Once};

use axum::Router;
use recipe_api_server::{
    auth::AuthManager,
    config::{Environment, ServerConfig},
    database::{Database, RecipeInput},
    models::{Ingredient, Recipe, Tag, User},
    resources::ServerResources,
    server::build_router,
};
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Password used by [`create_test_user`]
pub const TEST_PASSWORD: &str = "testpass123";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// In-memory resources with a cheap bcrypt cost
pub async fn create_test_resources() -> Arc<ServerResources> {
    init_test_logging();
    let database = Database::new("sqlite::memory:", 1)
        .await
        .expect("Failed to create test database");

    let mut config = ServerConfig::default();
    config.environment = Environment::Testing;
    config.auth.bcrypt_cost = 4;

    let auth_manager = AuthManager::new(b"test-jwt-secret", 24).with_bcrypt_cost(4);
    Arc::new(ServerResources::new(database, auth_manager, Arc::new(config)))
}

/// Full application router over test resources
pub fn create_test_app(resources: &Arc<ServerResources>) -> Router {
    build_router(resources)
}

/// Register a user through the service and issue a token for it
pub async fn create_test_user(resources: &ServerResources, email: &str) -> (User, String) {
    let user = resources
        .user_service
        .create_user(email, TEST_PASSWORD, "Test User")
        .await
        .expect("Failed to create test user");
    let token = resources
        .auth_manager
        .generate_token(&user)
        .expect("Failed to generate token");
    (user, token)
}

pub async fn create_tag(resources: &ServerResources, user: &User, name: &str) -> Tag {
    resources
        .database
        .tags()
        .create(user.id, name)
        .await
        .expect("Failed to create tag")
}

pub async fn create_ingredient(resources: &ServerResources, user: &User, name: &str) -> Ingredient {
    resources
        .database
        .ingredients()
        .create(user.id, name)
        .await
        .expect("Failed to create ingredient")
}

/// Sample recipe with the given links
pub async fn create_recipe(
    resources: &ServerResources,
    user: &User,
    title: &str,
    tags: Vec<i64>,
    ingredients: Vec<i64>,
) -> Recipe {
    let input = RecipeInput {
        title: title.to_owned(),
        time_minutes: 10,
        price: "5.00".parse().expect("valid price"),
        link: String::new(),
        tags,
        ingredients,
    };
    resources
        .database
        .recipes()
        .create(user.id, &input)
        .await
        .expect("Failed to create recipe")
}
