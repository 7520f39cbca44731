// src/services/menu_service.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::MenuRepository,
    models::{
        inventory::RecipeIngredientProductLink,
        menu::{MenuItem, Recipe, RecipeIngredient},
    },
};

#[derive(Clone)]
pub struct MenuService {
    menu_repo: MenuRepository,
}

impl MenuService {
    pub fn new(menu_repo: MenuRepository) -> Self {
        Self { menu_repo }
    }

    // --- RECEITAS ---

    pub async fn create_recipe<'e, E>(&self, executor: E, name: &str) -> Result<Recipe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.menu_repo.create_recipe(executor, name).await
    }

    pub async fn list_recipes(&self) -> Result<Vec<Recipe>, AppError> {
        self.menu_repo.list_recipes().await
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
        self.menu_repo.add_ingredient(executor, recipe_id, name).await
    }

    pub async fn list_ingredients(
        &self,
        recipe_id: i64,
    ) -> Result<Vec<RecipeIngredient>, AppError> {
        if self.menu_repo.get_recipe(recipe_id).await?.is_none() {
            return Err(AppError::RecipeNotFound(recipe_id));
        }
        self.menu_repo.list_ingredients(recipe_id).await
    }

    // --- ITENS DE CARDÁPIO ---

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
        self.menu_repo
            .create_menu_item(executor, name, price, recipe_id)
            .await
    }

    pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>, AppError> {
        self.menu_repo.list_menu_items().await
    }

    pub async fn get_menu_item(&self, menu_item_id: i64) -> Result<MenuItem, AppError> {
        self.menu_repo
            .get_menu_item(menu_item_id)
            .await?
            .ok_or(AppError::MenuItemNotFound(menu_item_id))
    }

    pub async fn update_menu_item<'e, E>(
        &self,
        executor: E,
        menu_item_id: i64,
        name: &str,
        price: Decimal,
        recipe_id: Option<i64>,
        is_active: bool,
    ) -> Result<MenuItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.menu_repo
            .update_menu_item(executor, menu_item_id, name, price, recipe_id, is_active)
            .await?
            .ok_or(AppError::MenuItemNotFound(menu_item_id))
    }

    pub async fn delete_menu_item<'e, E>(
        &self,
        executor: E,
        menu_item_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.menu_repo.delete_menu_item(executor, menu_item_id).await
    }

    // --- VÍNCULOS INSUMO -> PRODUTO ---

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
        self.menu_repo
            .create_link(executor, recipe_ingredient_id, product_id, quantity_per_serving)
            .await
    }

    pub async fn list_links(
        &self,
        recipe_ingredient_id: i64,
    ) -> Result<Vec<RecipeIngredientProductLink>, AppError> {
        self.menu_repo.list_links(recipe_ingredient_id).await
    }

    pub async fn delete_link<'e, E>(&self, executor: E, link_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.menu_repo.delete_link(executor, link_id).await
    }
}
