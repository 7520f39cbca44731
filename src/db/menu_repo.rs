// src/db/menu_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        inventory::RecipeIngredientProductLink,
        menu::{MenuItem, Recipe, RecipeIngredient},
    },
};

#[derive(Clone)]
pub struct MenuRepository {
    pool: PgPool,
}

impl MenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Receitas e insumos
    // ---

    pub async fn create_recipe<'e, E>(&self, executor: E, name: &str) -> Result<Recipe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Recipe>("INSERT INTO recipes (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::NameAlreadyExists(name.to_string());
                    }
                }
                e.into()
            })
    }

    pub async fn list_recipes(&self) -> Result<Vec<Recipe>, AppError> {
        let recipes = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(recipes)
    }

    pub async fn get_recipe(&self, recipe_id: i64) -> Result<Option<Recipe>, AppError> {
        let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recipe)
    }

    pub async fn add_ingredient<'e, E>(
        &self,
        executor: E,
        recipe_id: i64,
        name: &str,
    ) -> Result<RecipeIngredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RecipeIngredient>(
            "INSERT INTO recipe_ingredients (recipe_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(recipe_id)
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::RecipeNotFound(recipe_id);
                }
            }
            e.into()
        })
    }

    pub async fn list_ingredients(
        &self,
        recipe_id: i64,
    ) -> Result<Vec<RecipeIngredient>, AppError> {
        let ingredients = sqlx::query_as::<_, RecipeIngredient>(
            "SELECT * FROM recipe_ingredients WHERE recipe_id = $1 ORDER BY id ASC",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ingredients)
    }

    // ---
    // Itens de cardápio
    // ---

    pub async fn create_menu_item<'e, E>(
        &self,
        executor: E,
        name: &str,
        price: Decimal,
        recipe_id: Option<i64>,
    ) -> Result<MenuItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MenuItem>(
            r#"
            INSERT INTO menu_items (name, price, recipe_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(recipe_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NameAlreadyExists(name.to_string());
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::RecipeNotFound(recipe_id.unwrap_or_default());
                }
            }
            e.into()
        })
    }

    pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>, AppError> {
        let items = sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get_menu_item(&self, menu_item_id: i64) -> Result<Option<MenuItem>, AppError> {
        let item = sqlx::query_as::<_, MenuItem>("SELECT * FROM menu_items WHERE id = $1")
            .bind(menu_item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn update_menu_item<'e, E>(
        &self,
        executor: E,
        menu_item_id: i64,
        name: &str,
        price: Decimal,
        recipe_id: Option<i64>,
        is_active: bool,
    ) -> Result<Option<MenuItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MenuItem>(
            r#"
            UPDATE menu_items
            SET name = $2, price = $3, recipe_id = $4, is_active = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(menu_item_id)
        .bind(name)
        .bind(price)
        .bind(recipe_id)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NameAlreadyExists(name.to_string());
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::RecipeNotFound(recipe_id.unwrap_or_default());
                }
            }
            e.into()
        })
    }

    pub async fn delete_menu_item<'e, E>(
        &self,
        executor: E,
        menu_item_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(menu_item_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::DeleteRestricted;
                    }
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::MenuItemNotFound(menu_item_id));
        }
        Ok(())
    }

    // ---
    // Vínculos insumo -> produto
    // ---

    /// No máximo um vínculo por par (insumo, produto); os dois lados
    /// precisam existir.
    pub async fn create_link<'e, E>(
        &self,
        executor: E,
        recipe_ingredient_id: i64,
        product_id: i64,
        quantity_per_serving: Decimal,
    ) -> Result<RecipeIngredientProductLink, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RecipeIngredientProductLink>(
            r#"
            INSERT INTO recipe_ingredient_products
                (recipe_ingredient_id, product_id, quantity_per_serving)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(recipe_ingredient_id)
        .bind(product_id)
        .bind(quantity_per_serving)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::LinkAlreadyExists;
                }
                if db_err.is_foreign_key_violation() {
                    let constraint = db_err.constraint().unwrap_or_default();
                    if constraint.contains("product") {
                        return AppError::LinkNotFound(format!(
                            "produto {product_id} inexistente"
                        ));
                    }
                    return AppError::LinkNotFound(format!(
                        "insumo {recipe_ingredient_id} inexistente"
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn list_links(
        &self,
        recipe_ingredient_id: i64,
    ) -> Result<Vec<RecipeIngredientProductLink>, AppError> {
        let links = sqlx::query_as::<_, RecipeIngredientProductLink>(
            "SELECT * FROM recipe_ingredient_products WHERE recipe_ingredient_id = $1 ORDER BY id ASC",
        )
        .bind(recipe_ingredient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    pub async fn delete_link<'e, E>(&self, executor: E, link_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM recipe_ingredient_products WHERE id = $1")
            .bind(link_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::LinkNotFound(format!("vínculo {link_id} inexistente")));
        }
        Ok(())
    }
}
