// ABOUTME: HTTP integration tests for the recipe routes
// ABOUTME: Covers listing, filtering, detail expansion, create/update semantics and ownership
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{
    create_ingredient, create_recipe, create_tag, create_test_app, create_test_resources,
    create_test_user,
};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

const RECIPES_URL: &str = "/api/recipe/recipes/";

fn detail_url(id: i64) -> String {
    format!("{RECIPES_URL}{id}/")
}

fn ids(body: &[Value]) -> Vec<i64> {
    body.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_auth_required() {
    let resources = create_test_resources().await;

    let response = AxumTestRequest::get(RECIPES_URL)
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_retrieve_recipes_newest_first() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let first = create_recipe(&resources, &user, "Sample title", vec![], vec![]).await;
    let second = create_recipe(&resources, &user, "Sample title", vec![], vec![]).await;

    let response = AxumTestRequest::get(RECIPES_URL)
        .bearer(&token)
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 200);
    let body: Vec<Value> = response.json();
    assert_eq!(ids(&body), vec![second.id, first.id]);
    assert_eq!(body[0]["price"], "5.00");
    assert_eq!(body[0]["time_minutes"], 10);
    assert_eq!(body[0]["link"], "");
    assert_eq!(body[0]["tags"], json!([]));
}

#[tokio::test]
async fn test_recipes_limited_to_user() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let (other, _) = create_test_user(&resources, "other@example.com").await;
    create_recipe(&resources, &other, "Not mine", vec![], vec![]).await;
    let mine = create_recipe(&resources, &user, "Mine", vec![], vec![]).await;

    let response = AxumTestRequest::get(RECIPES_URL)
        .bearer(&token)
        .send(create_test_app(&resources))
        .await;

    let body: Vec<Value> = response.json();
    assert_eq!(ids(&body), vec![mine.id]);
}

#[tokio::test]
async fn test_view_recipe_detail() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let tag = create_tag(&resources, &user, "Vegan").await;
    let ingredient = create_ingredient(&resources, &user, "Salt").await;
    let recipe = create_recipe(&resources, &user, "Soup", vec![tag.id], vec![ingredient.id]).await;

    let response = AxumTestRequest::get(&detail_url(recipe.id))
        .bearer(&token)
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["title"], "Soup");
    assert_eq!(body["tags"], json!([{"id": tag.id, "name": "Vegan"}]));
    assert_eq!(body["ingredients"], json!([{"id": ingredient.id, "name": "Salt"}]));
    assert!(body["image"].is_null());
}

#[tokio::test]
async fn test_create_basic_recipe() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;

    let response = AxumTestRequest::post(RECIPES_URL)
        .bearer(&token)
        .json(&json!({"title": "Chocolate cheesecake", "time_minutes": 30, "price": 5.00}))
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    let recipe = resources
        .database
        .recipes()
        .get(user.id, body["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recipe.title, "Chocolate cheesecake");
    assert_eq!(recipe.time_minutes, 30);
    assert_eq!(recipe.price.to_string(), "5.00");
}

#[tokio::test]
async fn test_create_recipe_with_tags_and_ingredients() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let vegan = create_tag(&resources, &user, "Vegan").await;
    let dessert = create_tag(&resources, &user, "Dessert").await;
    let prawns = create_ingredient(&resources, &user, "Prawns").await;
    let ginger = create_ingredient(&resources, &user, "Ginger").await;

    let response = AxumTestRequest::post(RECIPES_URL)
        .bearer(&token)
        .json(&json!({
            "title": "Thai prawn red curry",
            "time_minutes": 20,
            "price": "7.00",
            "tags": [vegan.id, dessert.id],
            "ingredients": [prawns.id, ginger.id]
        }))
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["tags"], json!([vegan.id, dessert.id]));
    assert_eq!(body["ingredients"], json!([prawns.id, ginger.id]));
    assert_eq!(body["price"], "7.00");
}

#[tokio::test]
async fn test_create_recipe_rejects_foreign_tag() {
    let resources = create_test_resources().await;
    let (_, token) = create_test_user(&resources, "test@example.com").await;
    let (other, _) = create_test_user(&resources, "other@example.com").await;
    let foreign = create_tag(&resources, &other, "Theirs").await;

    let response = AxumTestRequest::post(RECIPES_URL)
        .bearer(&token)
        .json(&json!({
            "title": "Stolen",
            "time_minutes": 5,
            "price": 1,
            "tags": [foreign.id]
        }))
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["field"], "tags");
}

#[tokio::test]
async fn test_create_recipe_invalid_values() {
    let resources = create_test_resources().await;
    let (_, token) = create_test_user(&resources, "test@example.com").await;
    let app = create_test_app(&resources);

    for payload in [
        json!({"title": "", "time_minutes": 5, "price": 1}),
        json!({"title": "Soup", "time_minutes": -1, "price": 1}),
        json!({"title": "Soup", "time_minutes": 5, "price": "1000.00"}),
        json!({"title": "Soup", "time_minutes": 5, "price": "1.234"}),
        json!({"title": "Soup", "time_minutes": 5}),
    ] {
        let response = AxumTestRequest::post(RECIPES_URL)
            .bearer(&token)
            .json(&payload)
            .send(app.clone())
            .await;
        assert_eq!(response.status(), 400, "payload: {payload}");
    }
}

#[tokio::test]
async fn test_invalid_price_reports_price_field() {
    let resources = create_test_resources().await;
    let (_, token) = create_test_user(&resources, "test@example.com").await;

    let response = AxumTestRequest::post(RECIPES_URL)
        .bearer(&token)
        .json(&json!({"title": "Soup", "time_minutes": 5, "price": "cheap"}))
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["field"], "price");
}

#[tokio::test]
async fn test_filter_recipes_by_tags() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let vegan = create_tag(&resources, &user, "Vegan").await;
    let vegetarian = create_tag(&resources, &user, "Vegetarian").await;
    let curry = create_recipe(&resources, &user, "Thai curry", vec![vegan.id], vec![]).await;
    let tahini =
        create_recipe(&resources, &user, "Aubergine", vec![vegetarian.id], vec![]).await;
    create_recipe(&resources, &user, "Fish and chips", vec![], vec![]).await;

    let response = AxumTestRequest::get(&format!(
        "{RECIPES_URL}?tags={},{}",
        vegan.id, vegetarian.id
    ))
    .bearer(&token)
    .send(create_test_app(&resources))
    .await;

    let body: Vec<Value> = response.json();
    assert_eq!(ids(&body), vec![tahini.id, curry.id]);
}

#[tokio::test]
async fn test_filter_recipes_by_ingredients() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let feta = create_ingredient(&resources, &user, "Feta cheese").await;
    let chicken = create_ingredient(&resources, &user, "Chicken").await;
    let beans = create_recipe(&resources, &user, "Posh beans", vec![], vec![feta.id]).await;
    let cacciatore =
        create_recipe(&resources, &user, "Cacciatore", vec![], vec![chicken.id]).await;
    create_recipe(&resources, &user, "Steak", vec![], vec![]).await;

    let response = AxumTestRequest::get(&format!("{RECIPES_URL}?ingredients={}", feta.id))
        .bearer(&token)
        .send(create_test_app(&resources))
        .await;

    let body: Vec<Value> = response.json();
    assert_eq!(ids(&body), vec![beans.id]);
    assert!(!ids(&body).contains(&cacciatore.id));
}

#[tokio::test]
async fn test_filter_rejects_non_integer_ids() {
    let resources = create_test_resources().await;
    let (_, token) = create_test_user(&resources, "test@example.com").await;

    let response = AxumTestRequest::get(&format!("{RECIPES_URL}?tags=1,abc"))
        .bearer(&token)
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_partial_update_recipe() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let spicy = create_tag(&resources, &user, "Spicy").await;
    let curry = create_tag(&resources, &user, "Curry").await;
    let salt = create_ingredient(&resources, &user, "Salt").await;
    let recipe =
        create_recipe(&resources, &user, "Chicken tikka", vec![spicy.id], vec![salt.id]).await;

    let response = AxumTestRequest::patch(&detail_url(recipe.id))
        .bearer(&token)
        .json(&json!({"title": "Chicken tikka masala", "tags": [curry.id]}))
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["title"], "Chicken tikka masala");
    assert_eq!(body["tags"], json!([{"id": curry.id, "name": "Curry"}]));
    assert_eq!(body["ingredients"], json!([{"id": salt.id, "name": "Salt"}]));
}

#[tokio::test]
async fn test_full_update_recipe() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let spicy = create_tag(&resources, &user, "Spicy").await;
    let recipe = create_recipe(&resources, &user, "Chicken tikka", vec![spicy.id], vec![]).await;

    let response = AxumTestRequest::put(&detail_url(recipe.id))
        .bearer(&token)
        .json(&json!({"title": "Spaghetti carbonara", "time_minutes": 25, "price": 5.00}))
        .send(create_test_app(&resources))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["title"], "Spaghetti carbonara");
    assert_eq!(body["time_minutes"], 25);
    assert_eq!(body["price"], "5.00");
    assert_eq!(body["tags"], json!([]));
}

#[tokio::test]
async fn test_delete_recipe_keeps_tags() {
    let resources = create_test_resources().await;
    let (user, token) = create_test_user(&resources, "test@example.com").await;
    let tag = create_tag(&resources, &user, "Keep me").await;
    let recipe = create_recipe(&resources, &user, "Gone", vec![tag.id], vec![]).await;
    let app = create_test_app(&resources);

    let response = AxumTestRequest::delete(&detail_url(recipe.id))
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 204);

    let missing = AxumTestRequest::get(&detail_url(recipe.id))
        .bearer(&token)
        .send(app)
        .await;
    assert_eq!(missing.status(), 404);
    assert!(resources
        .database
        .tags()
        .get(user.id, tag.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_other_users_recipe_not_found() {
    let resources = create_test_resources().await;
    let (_, token) = create_test_user(&resources, "test@example.com").await;
    let (other, _) = create_test_user(&resources, "other@example.com").await;
    let recipe = create_recipe(&resources, &other, "Secret", vec![], vec![]).await;
    let app = create_test_app(&resources);

    let get = AxumTestRequest::get(&detail_url(recipe.id))
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(get.status(), 404);

    let patch = AxumTestRequest::patch(&detail_url(recipe.id))
        .bearer(&token)
        .json(&json!({"title": "Hijacked"}))
        .send(app)
        .await;
    assert_eq!(patch.status(), 404);
}

#[tokio::test]
async fn test_anonymous_malformed_body_is_unauthorized() {
    let resources = create_test_resources().await;

    let response = AxumTestRequest::post(RECIPES_URL)
        .header("content-type", "application/json")
        .raw_body("{\"title\":")
        .send(create_test_app(&resources))
        .await;
    assert_eq!(response.status(), 401);

    let response = AxumTestRequest::patch(&format!("{RECIPES_URL}abc/"))
        .header("content-type", "application/json")
        .raw_body("not json")
        .send(create_test_app(&resources))
        .await;
    assert_eq!(response.status(), 401);
}
