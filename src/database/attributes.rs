// ABOUTME: Database operations shared by tags and ingredients
// ABOUTME: Generic over RecipeAttribute so one manager serves both tables with owner scoping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Recipe API Contributors

use std::collections::BTreeSet;
use std::marker::PhantomData;

use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::RecipeAttribute;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

/// Tag or ingredient database operations manager
pub struct AttributesManager<T> {
    pool: SqlitePool,
    _attribute: PhantomData<fn() -> T>,
}

impl<T: RecipeAttribute> AttributesManager<T> {
    /// Create a new manager for the attribute table of `T`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _attribute: PhantomData,
        }
    }

    /// Create the attribute table
    pub(super) async fn migrate(&self) -> AppResult<()> {
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL
            )
            ",
            table = T::TABLE
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create {} table: {e}", T::TABLE)))?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_user_id ON {table}(user_id)",
            table = T::TABLE
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to index {}: {e}", T::TABLE)))?;

        Ok(())
    }

    /// Create a new attribute owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(&self, user_id: i64, name: &str) -> AppResult<T> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (user_id, name) VALUES ($1, $2)",
            T::TABLE
        ))
        .bind(user_id)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create {}: {e}", T::LABEL)))?;

        Ok(T::from_parts(
            result.last_insert_rowid(),
            user_id,
            name.to_owned(),
        ))
    }

    /// List the caller's attributes, newest name first
    ///
    /// With `assigned_only`, only attributes linked to at least one recipe are
    /// returned, each once.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list(&self, user_id: i64, assigned_only: bool) -> AppResult<Vec<T>> {
        let join = if assigned_only {
            format!(
                "INNER JOIN {link} l ON l.{column} = a.id",
                link = T::LINK_TABLE,
                column = T::LINK_COLUMN
            )
        } else {
            String::new()
        };

        let query = format!(
            r"
            SELECT DISTINCT a.id, a.user_id, a.name
            FROM {table} a
            {join}
            WHERE a.user_id = $1
            ORDER BY a.name DESC, a.id DESC
            ",
            table = T::TABLE
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list {}: {e}", T::TABLE)))?;

        Ok(rows.iter().map(row_to_attribute).collect())
    }

    /// Get one of the caller's attributes
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, user_id: i64, id: i64) -> AppResult<Option<T>> {
        let row = sqlx::query(&format!(
            "SELECT id, user_id, name FROM {} WHERE id = $1 AND user_id = $2",
            T::TABLE
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get {}: {e}", T::LABEL)))?;

        Ok(row.as_ref().map(row_to_attribute))
    }

    /// Rename one of the caller's attributes
    ///
    /// Returns `None` when the row does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update(&self, user_id: i64, id: i64, name: &str) -> AppResult<Option<T>> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET name = $1 WHERE id = $2 AND user_id = $3",
            T::TABLE
        ))
        .bind(name)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update {}: {e}", T::LABEL)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(T::from_parts(id, user_id, name.to_owned())))
    }

    /// Delete one of the caller's attributes; recipe links go with it
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, user_id: i64, id: i64) -> AppResult<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            T::TABLE
        ))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete {}: {e}", T::LABEL)))?;

        Ok(result.rows_affected() > 0)
    }

    /// Subset of `ids` that exist and belong to `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn owned_ids(&self, user_id: i64, ids: &[i64]) -> AppResult<Vec<i64>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        owned_ids_in::<T>(&mut *conn, user_id, ids).await
    }
}

/// Owned-id lookup usable inside a transaction
pub(super) async fn owned_ids_in<T: RecipeAttribute>(
    conn: &mut SqliteConnection,
    user_id: i64,
    ids: &[i64],
) -> AppResult<Vec<i64>> {
    let unique: BTreeSet<i64> = ids.iter().copied().collect();
    if unique.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT id FROM {} WHERE user_id = ", T::TABLE));
    builder.push_bind(user_id);
    builder.push(" AND id IN (");
    let mut separated = builder.separated(", ");
    for id in &unique {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");

    builder
        .build_query_scalar::<i64>()
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to check {} ownership: {e}", T::LABEL)))
}

/// Attributes linked to a recipe, ordered like [`AttributesManager::list`]
pub(super) async fn linked_to_recipe<T: RecipeAttribute>(
    conn: &mut SqliteConnection,
    recipe_id: i64,
) -> AppResult<Vec<T>> {
    let query = format!(
        r"
        SELECT a.id, a.user_id, a.name
        FROM {table} a
        INNER JOIN {link} l ON l.{column} = a.id
        WHERE l.recipe_id = $1
        ORDER BY a.name DESC, a.id DESC
        ",
        table = T::TABLE,
        link = T::LINK_TABLE,
        column = T::LINK_COLUMN
    );

    let rows = sqlx::query(&query)
        .bind(recipe_id)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to load recipe {}: {e}", T::TABLE)))?;

    Ok(rows.iter().map(row_to_attribute).collect())
}

fn row_to_attribute<T: RecipeAttribute>(row: &SqliteRow) -> T {
    T::from_parts(row.get("id"), row.get("user_id"), row.get("name"))
}
