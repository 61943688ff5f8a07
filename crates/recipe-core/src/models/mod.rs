// ABOUTME: Core data models for the recipe API
// ABOUTME: Re-exports User, Tag, Ingredient, Recipe and their supporting types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

//! # Data Models
//!
//! Storage-agnostic domain types. Every [`Tag`], [`Ingredient`] and [`Recipe`]
//! carries the id of the user that owns it; the server never returns a row
//! whose `user_id` differs from the authenticated caller.

mod attribute;
mod recipe;
mod user;

pub use attribute::{Ingredient, RecipeAttribute, Tag};
pub use recipe::{Price, Recipe, RecipeDetail};
pub use user::{normalize_email, NewUser, User};
