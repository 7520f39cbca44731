// src/handlers/tables.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::tables::RestaurantTable};

fn default_capacity() -> i32 {
    4
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTablePayload {
    #[validate(range(min = 1, message = "O número da mesa deve ser positivo."))]
    pub number: i32,

    #[validate(length(max = 60, message = "O rótulo deve ter no máximo 60 caracteres."))]
    pub label: Option<String>,

    #[validate(range(min = 1, message = "A capacidade deve ser de pelo menos 1 lugar."))]
    #[serde(default = "default_capacity")]
    pub capacity: i32,
}

#[utoipa::path(
    post,
    path = "/api/tables",
    tag = "Tables",
    request_body = CreateTablePayload,
    responses(
        (status = 201, description = "Mesa criada", body = RestaurantTable),
        (status = 409, description = "Número de mesa já cadastrado")
    )
)]
pub async fn create_table(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTablePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let table = app_state
        .tables_repo
        .create_table(
            &app_state.db_pool,
            payload.number,
            payload.label.as_deref(),
            payload.capacity,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(table)))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    tag = "Tables",
    responses((status = 200, description = "Mesas", body = [RestaurantTable]))
)]
pub async fn list_tables(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tables = app_state.tables_repo.list_tables().await?;
    Ok((StatusCode::OK, Json(tables)))
}

#[utoipa::path(
    put,
    path = "/api/tables/{table_id}",
    tag = "Tables",
    request_body = CreateTablePayload,
    params(("table_id" = i64, Path, description = "ID da mesa")),
    responses(
        (status = 200, description = "Mesa atualizada", body = RestaurantTable),
        (status = 404, description = "Mesa não encontrada")
    )
)]
pub async fn update_table(
    State(app_state): State<AppState>,
    Path(table_id): Path<i64>,
    Json(payload): Json<CreateTablePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let table = app_state
        .tables_repo
        .update_table(
            &app_state.db_pool,
            table_id,
            payload.number,
            payload.label.as_deref(),
            payload.capacity,
        )
        .await?
        .ok_or(AppError::TableNotFound(table_id))?;

    Ok((StatusCode::OK, Json(table)))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{table_id}",
    tag = "Tables",
    params(("table_id" = i64, Path, description = "ID da mesa")),
    responses(
        (status = 204, description = "Mesa removida"),
        (status = 404, description = "Mesa não encontrada")
    )
)]
pub async fn delete_table(
    State(app_state): State<AppState>,
    Path(table_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .tables_repo
        .delete_table(&app_state.db_pool, table_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
