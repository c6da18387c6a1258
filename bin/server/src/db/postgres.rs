//! PostgreSQL drink store.

use super::{DrinkStore, StoreError};
use async_trait::async_trait;
use coffee_shop_core::{Drink, DrinkChanges, DrinkId, NewDrink, Recipe, Result};
use sqlx::{FromRow, PgPool};

/// Row type for drink queries.
#[derive(FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl DrinkRow {
    fn try_into_drink(self) -> Result<Drink, StoreError> {
        let id = DrinkId::new(self.id);
        let recipe = Recipe::from_stored(&self.recipe).map_err(|e| StoreError::CorruptRecipe {
            id,
            details: e.to_string(),
        })?;
        Ok(Drink::new(id, self.title, recipe))
    }
}

fn database_error(err: sqlx::Error, title: Option<&str>) -> StoreError {
    let unique_violation = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    match title {
        Some(title) if unique_violation => StoreError::DuplicateTitle {
            title: title.to_string(),
        },
        _ => StoreError::Database {
            details: err.to_string(),
        },
    }
}

fn encode(recipe: &Recipe) -> Result<String, StoreError> {
    Ok(recipe.to_stored().map_err(|e| StoreError::Encode {
        details: e.to_string(),
    })?)
}

/// Drink store backed by the `drinks` table.
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    /// Creates a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let rows: Vec<DrinkRow> = sqlx::query_as(
            r#"
            SELECT id, title, recipe
            FROM drinks
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error(e, None))?;

        rows.into_iter().map(DrinkRow::try_into_drink).collect()
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let recipe = encode(drink.recipe())?;
        let row: DrinkRow = sqlx::query_as(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(drink.title())
        .bind(&recipe)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error(e, Some(drink.title())))?;

        row.try_into_drink()
    }

    async fn update(
        &self,
        id: DrinkId,
        changes: DrinkChanges,
    ) -> Result<Option<Drink>, StoreError> {
        let recipe = changes.recipe().map(encode).transpose()?;
        let row: Option<DrinkRow> = sqlx::query_as(
            r#"
            UPDATE drinks
            SET title = COALESCE($2, title), recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id.get())
        .bind(changes.title())
        .bind(recipe.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, changes.title()))?;

        row.map(DrinkRow::try_into_drink).transpose()
    }

    async fn delete(&self, id: DrinkId) -> Result<Option<DrinkId>, StoreError> {
        let deleted: Option<i64> = sqlx::query_scalar(
            r#"
            DELETE FROM drinks
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error(e, None))?;

        Ok(deleted.map(DrinkId::new))
    }

    async fn reset_with_seed(&self) -> Result<Drink, StoreError> {
        let seed = NewDrink::seed();
        let recipe = encode(seed.recipe())?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error(e, None))?;

        sqlx::query("TRUNCATE drinks RESTART IDENTITY")
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error(e, None))?;

        let row: DrinkRow = sqlx::query_as(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(seed.title())
        .bind(&recipe)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| database_error(e, None))?;

        tx.commit().await.map_err(|e| database_error(e, None))?;

        row.try_into_drink()
    }
}
