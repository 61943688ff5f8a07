// ABOUTME: Database operations for recipes and their tag/ingredient links
// ABOUTME: Writes run in a transaction that verifies every linked id belongs to the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::{Ingredient, Price, Recipe, RecipeAttribute, RecipeDetail, Tag};
use sqlx::pool::PoolConnection;
use sqlx::{
    sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool, Transaction,
};
use tracing::debug;

use super::attributes::{linked_to_recipe, owned_ids_in};
use super::parse_timestamp;

const RECIPE_COLUMNS: &str =
    "r.id, r.user_id, r.title, r.time_minutes, r.price, r.link, r.image, r.created_at, r.updated_at";

/// Full set of writable recipe fields (create and replace)
#[derive(Debug, Clone)]
pub struct RecipeInput {
    /// Recipe title
    pub title: String,
    /// Preparation time in minutes
    pub time_minutes: i32,
    /// Price
    pub price: Price,
    /// External link, empty for none
    pub link: String,
    /// Tag ids to link; all must belong to the caller
    pub tags: Vec<i64>,
    /// Ingredient ids to link; all must belong to the caller
    pub ingredients: Vec<i64>,
}

/// Partial recipe update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    /// New title
    pub title: Option<String>,
    /// New preparation time
    pub time_minutes: Option<i32>,
    /// New price
    pub price: Option<Price>,
    /// New link
    pub link: Option<String>,
    /// Replacement tag ids
    pub tags: Option<Vec<i64>>,
    /// Replacement ingredient ids
    pub ingredients: Option<Vec<i64>>,
}

/// Filter options for listing recipes
///
/// A recipe matches a non-empty id list when it is linked to any of the ids;
/// both lists must match when both are given.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Tag ids
    pub tags: Vec<i64>,
    /// Ingredient ids
    pub ingredients: Vec<i64>,
}

/// Recipe database operations manager
pub struct RecipesManager {
    pool: SqlitePool,
}

impl RecipesManager {
    /// Create a new recipes manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the recipes table and the link tables
    pub(super) async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                time_minutes INTEGER NOT NULL CHECK (time_minutes >= 0),
                price TEXT NOT NULL,
                link TEXT NOT NULL DEFAULT '',
                image TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipes table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_user_id ON recipes(user_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to index recipes: {e}")))?;

        self.migrate_links::<Tag>().await?;
        self.migrate_links::<Ingredient>().await
    }

    async fn migrate_links<T: RecipeAttribute>(&self) -> AppResult<()> {
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS {link} (
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                {column} INTEGER NOT NULL REFERENCES {table}(id) ON DELETE CASCADE,
                PRIMARY KEY (recipe_id, {column})
            )
            ",
            link = T::LINK_TABLE,
            column = T::LINK_COLUMN,
            table = T::TABLE
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create {}: {e}", T::LINK_TABLE)))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{link}_{column} ON {link}({column})",
            link = T::LINK_TABLE,
            column = T::LINK_COLUMN
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to index {}: {e}", T::LINK_TABLE)))?;

        Ok(())
    }

    /// Create a recipe and its links in one transaction
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error if a tag or ingredient id is missing
    /// or belongs to another user, or a database error
    pub async fn create(&self, user_id: i64, input: &RecipeInput) -> AppResult<Recipe> {
        let mut tx = self.begin().await?;

        let tag_ids = check_owned::<Tag>(&mut tx, user_id, &input.tags, "tags").await?;
        let ingredient_ids =
            check_owned::<Ingredient>(&mut tx, user_id, &input.ingredients, "ingredients").await?;

        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO recipes (user_id, title, time_minutes, price, link, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
        )
        .bind(user_id)
        .bind(&input.title)
        .bind(input.time_minutes)
        .bind(input.price.to_string())
        .bind(&input.link)
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        let id = result.last_insert_rowid();
        replace_links::<Tag>(&mut tx, id, &tag_ids).await?;
        replace_links::<Ingredient>(&mut tx, id, &ingredient_ids).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe: {e}")))?;

        debug!(recipe_id = id, user_id, "Created recipe");

        Ok(Recipe {
            id,
            user_id,
            title: input.title.clone(),
            time_minutes: input.time_minutes,
            price: input.price,
            link: input.link.clone(),
            image: None,
            tag_ids,
            ingredient_ids,
            created_at: now,
            updated_at: now,
        })
    }

    /// List the caller's recipes, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list(&self, user_id: i64, filter: &RecipeFilter) -> AppResult<Vec<Recipe>> {
        let mut conn = self.acquire().await?;

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.user_id = "));
        builder.push_bind(user_id);
        push_link_filter::<Tag>(&mut builder, &filter.tags);
        push_link_filter::<Ingredient>(&mut builder, &filter.ingredients);
        builder.push(" ORDER BY r.id DESC");

        let rows = builder
            .build()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        let recipe_ids: Vec<i64> = rows.iter().map(|row| row.get("id")).collect();
        let mut tags = link_ids::<Tag>(&mut conn, &recipe_ids).await?;
        let mut ingredients = link_ids::<Ingredient>(&mut conn, &recipe_ids).await?;

        rows.iter()
            .map(|row| {
                let id: i64 = row.get("id");
                row_to_recipe(
                    row,
                    tags.remove(&id).unwrap_or_default(),
                    ingredients.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Get one of the caller's recipes with its link ids
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, user_id: i64, id: i64) -> AppResult<Option<Recipe>> {
        let mut conn = self.acquire().await?;
        fetch_recipe(&mut conn, user_id, id).await
    }

    /// Get one of the caller's recipes with tags and ingredients expanded
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_detail(&self, user_id: i64, id: i64) -> AppResult<Option<RecipeDetail>> {
        let mut conn = self.acquire().await?;
        let Some(recipe) = fetch_recipe(&mut conn, user_id, id).await? else {
            return Ok(None);
        };

        let tags = linked_to_recipe::<Tag>(&mut conn, id).await?;
        let ingredients = linked_to_recipe::<Ingredient>(&mut conn, id).await?;

        Ok(Some(RecipeDetail {
            recipe,
            tags,
            ingredients,
        }))
    }

    /// Replace every writable field of a recipe
    ///
    /// Links not listed in `input` are removed.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error for foreign or missing link ids, or a
    /// database error
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        input: &RecipeInput,
    ) -> AppResult<Option<Recipe>> {
        let patch = RecipePatch {
            title: Some(input.title.clone()),
            time_minutes: Some(input.time_minutes),
            price: Some(input.price),
            link: Some(input.link.clone()),
            tags: Some(input.tags.clone()),
            ingredients: Some(input.ingredients.clone()),
        };
        self.patch(user_id, id, &patch).await
    }

    /// Apply a partial update; link lists are replaced only when present
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error for foreign or missing link ids, or a
    /// database error
    pub async fn patch(
        &self,
        user_id: i64,
        id: i64,
        patch: &RecipePatch,
    ) -> AppResult<Option<Recipe>> {
        let mut tx = self.begin().await?;

        let Some(existing) = fetch_recipe(&mut tx, user_id, id).await? else {
            return Ok(None);
        };

        let tag_ids = match &patch.tags {
            Some(ids) => check_owned::<Tag>(&mut tx, user_id, ids, "tags").await?,
            None => existing.tag_ids.clone(),
        };
        let ingredient_ids = match &patch.ingredients {
            Some(ids) => check_owned::<Ingredient>(&mut tx, user_id, ids, "ingredients").await?,
            None => existing.ingredient_ids.clone(),
        };

        let updated = Recipe {
            title: patch.title.clone().unwrap_or(existing.title),
            time_minutes: patch.time_minutes.unwrap_or(existing.time_minutes),
            price: patch.price.unwrap_or(existing.price),
            link: patch.link.clone().unwrap_or(existing.link),
            tag_ids,
            ingredient_ids,
            updated_at: Utc::now(),
            ..existing
        };

        sqlx::query(
            r"
            UPDATE recipes SET
                title = $1, time_minutes = $2, price = $3, link = $4, updated_at = $5
            WHERE id = $6 AND user_id = $7
            ",
        )
        .bind(&updated.title)
        .bind(updated.time_minutes)
        .bind(updated.price.to_string())
        .bind(&updated.link)
        .bind(updated.updated_at.to_rfc3339())
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        if patch.tags.is_some() {
            replace_links::<Tag>(&mut tx, id, &updated.tag_ids).await?;
        }
        if patch.ingredients.is_some() {
            replace_links::<Ingredient>(&mut tx, id, &updated.ingredient_ids).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit recipe update: {e}")))?;

        debug!(recipe_id = id, user_id, "Updated recipe");
        Ok(Some(updated))
    }

    /// Delete one of the caller's recipes; linked tags and ingredients stay
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, user_id: i64, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))
    }

    async fn acquire(&self) -> AppResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))
    }
}

/// Verify every id is owned by the caller, returning them sorted and deduplicated
async fn check_owned<T: RecipeAttribute>(
    conn: &mut SqliteConnection,
    user_id: i64,
    ids: &[i64],
    field: &str,
) -> AppResult<Vec<i64>> {
    let owned = owned_ids_in::<T>(conn, user_id, ids).await?;
    let owned_set: BTreeSet<i64> = owned.iter().copied().collect();

    if let Some(missing) = ids.iter().find(|id| !owned_set.contains(id)) {
        return Err(AppError::invalid_input(format!(
            "Invalid pk \"{missing}\" - object does not exist."
        ))
        .with_field(field));
    }
    Ok(owned)
}

async fn replace_links<T: RecipeAttribute>(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    ids: &[i64],
) -> AppResult<()> {
    sqlx::query(&format!("DELETE FROM {} WHERE recipe_id = $1", T::LINK_TABLE))
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear {}: {e}", T::LINK_TABLE)))?;

    if ids.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "INSERT INTO {} (recipe_id, {}) ",
        T::LINK_TABLE,
        T::LINK_COLUMN
    ));
    builder.push_values(ids, |mut row, id| {
        row.push_bind(recipe_id).push_bind(*id);
    });

    builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to link {}: {e}", T::LINK_TABLE)))?;

    Ok(())
}

fn push_link_filter<T: RecipeAttribute>(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    if ids.is_empty() {
        return;
    }

    builder.push(format!(
        " AND r.id IN (SELECT recipe_id FROM {} WHERE {} IN (",
        T::LINK_TABLE,
        T::LINK_COLUMN
    ));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated("))");
}

/// Link ids for each recipe, ascending
async fn link_ids<T: RecipeAttribute>(
    conn: &mut SqliteConnection,
    recipe_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<i64>>> {
    let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
    if recipe_ids.is_empty() {
        return Ok(map);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT recipe_id, {} AS attribute_id FROM {} WHERE recipe_id IN (",
        T::LINK_COLUMN,
        T::LINK_TABLE
    ));
    let mut separated = builder.separated(", ");
    for id in recipe_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY attribute_id");

    let rows = builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to load {}: {e}", T::LINK_TABLE)))?;

    for row in &rows {
        map.entry(row.get("recipe_id"))
            .or_default()
            .push(row.get("attribute_id"));
    }
    Ok(map)
}

async fn fetch_recipe(
    conn: &mut SqliteConnection,
    user_id: i64,
    id: i64,
) -> AppResult<Option<Recipe>> {
    let row = sqlx::query(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1 AND r.user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tag_ids = link_ids::<Tag>(conn, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default();
    let ingredient_ids = link_ids::<Ingredient>(conn, &[id])
        .await?
        .remove(&id)
        .unwrap_or_default();

    row_to_recipe(&row, tag_ids, ingredient_ids).map(Some)
}

fn row_to_recipe(row: &SqliteRow, tag_ids: Vec<i64>, ingredient_ids: Vec<i64>) -> AppResult<Recipe> {
    let price: String = row.get("price");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Recipe {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        time_minutes: row.get("time_minutes"),
        price: price
            .parse()
            .map_err(|e: AppError| AppError::internal(format!("Invalid stored price: {e}")))?,
        link: row.get("link"),
        image: row.get("image"),
        tag_ids,
        ingredient_ids,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
