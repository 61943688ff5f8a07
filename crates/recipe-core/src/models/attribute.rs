// ABOUTME: Tag and Ingredient models and the RecipeAttribute trait they share
// ABOUTME: The trait carries table names so storage and routes are written once for both
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// A named, user-owned row that recipes link to
///
/// `Tag` and `Ingredient` differ only in the tables they live in, so storage
/// and HTTP handlers are generic over this trait.
pub trait RecipeAttribute: Send + Sync + Unpin + Sized + 'static {
    /// Table holding the attribute rows
    const TABLE: &'static str;
    /// Join table linking recipes to this attribute
    const LINK_TABLE: &'static str;
    /// Column in `LINK_TABLE` referencing `TABLE`
    const LINK_COLUMN: &'static str;
    /// Human-readable label used in error messages and logs
    const LABEL: &'static str;

    /// Build a value from its stored columns
    fn from_parts(id: i64, user_id: i64, name: String) -> Self;

    /// Primary key
    fn id(&self) -> i64;

    /// Owning user
    fn user_id(&self) -> i64;

    /// Display name
    fn name(&self) -> &str;
}

/// Label a user attaches to recipes (e.g. "Vegan")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Primary key
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Tag name
    pub name: String,
}

/// Ingredient a user attaches to recipes (e.g. "Salt")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Primary key
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Ingredient name
    pub name: String,
}

macro_rules! impl_recipe_attribute {
    ($ty:ty, $table:literal, $link_table:literal, $link_column:literal, $label:literal) => {
        impl RecipeAttribute for $ty {
            const TABLE: &'static str = $table;
            const LINK_TABLE: &'static str = $link_table;
            const LINK_COLUMN: &'static str = $link_column;
            const LABEL: &'static str = $label;

            fn from_parts(id: i64, user_id: i64, name: String) -> Self {
                Self { id, user_id, name }
            }

            fn id(&self) -> i64 {
                self.id
            }

            fn user_id(&self) -> i64 {
                self.user_id
            }

            fn name(&self) -> &str {
                &self.name
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(&self.name)
            }
        }
    };
}

impl_recipe_attribute!(Tag, "tags", "recipe_tags", "tag_id", "Tag");
impl_recipe_attribute!(
    Ingredient,
    "ingredients",
    "recipe_ingredients",
    "ingredient_id",
    "Ingredient"
);
