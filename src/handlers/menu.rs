// src/handlers/menu.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        inventory::RecipeIngredientProductLink,
        menu::{MenuItem, Recipe, RecipeIngredient},
    },
};

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Receitas
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipePayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/menu/recipes",
    tag = "Menu",
    request_body = CreateRecipePayload,
    responses(
        (status = 201, description = "Receita criada", body = Recipe),
        (status = 409, description = "Nome já cadastrado")
    )
)]
pub async fn create_recipe(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateRecipePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let recipe = app_state
        .menu_service
        .create_recipe(&app_state.db_pool, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

#[utoipa::path(
    get,
    path = "/api/menu/recipes",
    tag = "Menu",
    responses((status = 200, description = "Receitas", body = [Recipe]))
)]
pub async fn get_all_recipes(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let recipes = app_state.menu_service.list_recipes().await?;
    Ok((StatusCode::OK, Json(recipes)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddIngredientPayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/menu/recipes/{recipe_id}/ingredients",
    tag = "Menu",
    request_body = AddIngredientPayload,
    params(("recipe_id" = i64, Path, description = "ID da receita")),
    responses(
        (status = 201, description = "Insumo adicionado à receita", body = RecipeIngredient),
        (status = 404, description = "Receita não encontrada")
    )
)]
pub async fn add_ingredient(
    State(app_state): State<AppState>,
    Path(recipe_id): Path<i64>,
    Json(payload): Json<AddIngredientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let ingredient = app_state
        .menu_service
        .add_ingredient(&app_state.db_pool, recipe_id, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(ingredient)))
}

#[utoipa::path(
    get,
    path = "/api/menu/recipes/{recipe_id}/ingredients",
    tag = "Menu",
    params(("recipe_id" = i64, Path, description = "ID da receita")),
    responses(
        (status = 200, description = "Insumos da receita", body = [RecipeIngredient]),
        (status = 404, description = "Receita não encontrada")
    )
)]
pub async fn list_ingredients(
    State(app_state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ingredients = app_state.menu_service.list_ingredients(recipe_id).await?;
    Ok((StatusCode::OK, Json(ingredients)))
}

// ---
// Itens de cardápio
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuItemPayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub price: Decimal,

    pub recipe_id: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/menu/items",
    tag = "Menu",
    request_body = CreateMenuItemPayload,
    responses(
        (status = 201, description = "Item de cardápio criado", body = MenuItem),
        (status = 409, description = "Nome já cadastrado")
    )
)]
pub async fn create_menu_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateMenuItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .menu_service
        .create_menu_item(&app_state.db_pool, &payload.name, payload.price, payload.recipe_id)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/menu/items",
    tag = "Menu",
    responses((status = 200, description = "Itens do cardápio", body = [MenuItem]))
)]
pub async fn get_all_menu_items(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.menu_service.list_menu_items().await?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/menu/items/{menu_item_id}",
    tag = "Menu",
    params(("menu_item_id" = i64, Path, description = "ID do item de cardápio")),
    responses(
        (status = 200, description = "Item de cardápio", body = MenuItem),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn get_menu_item(
    State(app_state): State<AppState>,
    Path(menu_item_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.menu_service.get_menu_item(menu_item_id).await?;
    Ok((StatusCode::OK, Json(item)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemPayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    pub recipe_id: Option<i64>,

    pub is_active: bool,
}

#[utoipa::path(
    put,
    path = "/api/menu/items/{menu_item_id}",
    tag = "Menu",
    request_body = UpdateMenuItemPayload,
    params(("menu_item_id" = i64, Path, description = "ID do item de cardápio")),
    responses(
        (status = 200, description = "Item atualizado", body = MenuItem),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn update_menu_item(
    State(app_state): State<AppState>,
    Path(menu_item_id): Path<i64>,
    Json(payload): Json<UpdateMenuItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .menu_service
        .update_menu_item(
            &app_state.db_pool,
            menu_item_id,
            &payload.name,
            payload.price,
            payload.recipe_id,
            payload.is_active,
        )
        .await?;

    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    delete,
    path = "/api/menu/items/{menu_item_id}",
    tag = "Menu",
    params(("menu_item_id" = i64, Path, description = "ID do item de cardápio")),
    responses(
        (status = 204, description = "Item removido"),
        (status = 409, description = "Item referenciado por pedidos")
    )
)]
pub async fn delete_menu_item(
    State(app_state): State<AppState>,
    Path(menu_item_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .menu_service
        .delete_menu_item(&app_state.db_pool, menu_item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Vínculos insumo -> produto
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkProductPayload {
    #[validate(range(min = 1, message = "O produto deve ser um id positivo."))]
    pub product_id: i64,

    #[validate(custom(function = "validate_positive"))]
    pub quantity_per_serving: Decimal,
}

#[utoipa::path(
    post,
    path = "/api/menu/ingredients/{ingredient_id}/products",
    tag = "Menu",
    request_body = LinkProductPayload,
    params(("ingredient_id" = i64, Path, description = "ID do insumo da receita")),
    responses(
        (status = 201, description = "Vínculo criado", body = RecipeIngredientProductLink),
        (status = 404, description = "Insumo ou produto inexistente"),
        (status = 409, description = "Vínculo já cadastrado para o par")
    )
)]
pub async fn link_product(
    State(app_state): State<AppState>,
    Path(ingredient_id): Path<i64>,
    Json(payload): Json<LinkProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let link = app_state
        .menu_service
        .create_link(
            &app_state.db_pool,
            ingredient_id,
            payload.product_id,
            payload.quantity_per_serving,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(link)))
}

#[utoipa::path(
    get,
    path = "/api/menu/ingredients/{ingredient_id}/products",
    tag = "Menu",
    params(("ingredient_id" = i64, Path, description = "ID do insumo da receita")),
    responses(
        (status = 200, description = "Vínculos do insumo", body = [RecipeIngredientProductLink])
    )
)]
pub async fn list_ingredient_links(
    State(app_state): State<AppState>,
    Path(ingredient_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let links = app_state.menu_service.list_links(ingredient_id).await?;
    Ok((StatusCode::OK, Json(links)))
}

#[utoipa::path(
    delete,
    path = "/api/menu/links/{link_id}",
    tag = "Menu",
    params(("link_id" = i64, Path, description = "ID do vínculo")),
    responses(
        (status = 204, description = "Vínculo removido"),
        (status = 404, description = "Vínculo não encontrado")
    )
)]
pub async fn delete_link(
    State(app_state): State<AppState>,
    Path(link_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .menu_service
        .delete_link(&app_state.db_pool, link_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
