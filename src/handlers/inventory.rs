// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::{
        error::AppError,
        pagination::{Paginated, Pagination},
    },
    config::AppState,
    db::TransactionFilter,
    models::inventory::{InventoryTransaction, Product, ReferenceType, TransactionType},
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, max = 20, message = "A unidade de medida é obrigatória."))]
    pub unit: String,

    // Estoque inicial opcional: entra no livro-razão como ajuste.
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)] // Se o JSON não tiver esse campo, assume 0
    pub initial_quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub low_stock_threshold: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    pub cost_per_unit: Option<Decimal>,

    pub supplier: Option<String>,
}

// ---
// Handler: create_product
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 409, description = "Nome já cadastrado")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .inventory_service
        .create_product(
            &app_state.db_pool,
            &payload.name,
            &payload.unit,
            payload.initial_quantity,
            payload
                .low_stock_threshold
                .unwrap_or_else(|| Decimal::from(10)),
            payload.cost_per_unit,
            payload.supplier.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Inventory",
    responses((status = 200, description = "Lista de produtos", body = [Product]))
)]
pub async fn get_all_products(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.inventory_service.list_products().await?;
    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products/low-stock",
    tag = "Inventory",
    responses((status = 200, description = "Produtos no alerta de estoque baixo", body = [Product]))
)]
pub async fn get_low_stock_products(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.inventory_service.list_low_stock().await?;
    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/products/{product_id}",
    tag = "Inventory",
    params(("product_id" = i64, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.inventory_service.get_product(product_id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// ---
// Payload: UpdateProduct (cadastro, nunca o saldo)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, max = 20, message = "A unidade de medida é obrigatória."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub low_stock_threshold: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub cost_per_unit: Option<Decimal>,

    pub supplier: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/inventory/products/{product_id}",
    tag = "Inventory",
    request_body = UpdateProductPayload,
    params(("product_id" = i64, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .inventory_service
        .update_product(
            &app_state.db_pool,
            product_id,
            &payload.name,
            &payload.unit,
            payload.low_stock_threshold,
            payload.cost_per_unit,
            payload.supplier.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/products/{product_id}",
    tag = "Inventory",
    params(("product_id" = i64, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 409, description = "Produto referenciado por lançamentos ou receitas")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .inventory_service
        .delete_product(&app_state.db_pool, product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Operações manuais de estoque
// ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockOperationResponse {
    pub product: Product,
    pub transaction: InventoryTransaction,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestockPayload {
    #[validate(range(min = 1, message = "O produto deve ser um id positivo."))]
    pub product_id: i64,

    // O sinal é normalizado pelo serviço: reposição sempre soma.
    pub amount: Decimal,

    #[validate(length(max = 1000, message = "As observações devem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/inventory/restock",
    tag = "Inventory",
    request_body = RestockPayload,
    responses(
        (status = 200, description = "Reposição registrada", body = StockOperationResponse),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn restock(
    State(app_state): State<AppState>,
    Json(payload): Json<RestockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (transaction, product) = app_state
        .inventory_service
        .restock(
            &app_state.db_pool,
            payload.product_id,
            payload.amount,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(StockOperationResponse { product, transaction })))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustPayload {
    #[validate(range(min = 1, message = "O produto deve ser um id positivo."))]
    pub product_id: i64,

    // Delta com qualquer sinal; o resultado não pode ficar negativo.
    pub delta: Decimal,

    #[validate(length(max = 1000, message = "As observações devem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/inventory/adjust",
    tag = "Inventory",
    request_body = AdjustPayload,
    responses(
        (status = 200, description = "Ajuste registrado", body = StockOperationResponse),
        (status = 409, description = "O ajuste deixaria o saldo negativo")
    )
)]
pub async fn adjust(
    State(app_state): State<AppState>,
    Json(payload): Json<AdjustPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (transaction, product) = app_state
        .inventory_service
        .adjust(
            &app_state.db_pool,
            payload.product_id,
            payload.delta,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(StockOperationResponse { product, transaction })))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WastePayload {
    #[validate(range(min = 1, message = "O produto deve ser um id positivo."))]
    pub product_id: i64,

    pub amount: Decimal,

    #[validate(length(max = 1000, message = "As observações devem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/inventory/waste",
    tag = "Inventory",
    request_body = WastePayload,
    responses(
        (status = 200, description = "Perda registrada", body = StockOperationResponse),
        (status = 409, description = "A perda deixaria o saldo negativo")
    )
)]
pub async fn record_waste(
    State(app_state): State<AppState>,
    Json(payload): Json<WastePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (transaction, product) = app_state
        .inventory_service
        .record_waste(
            &app_state.db_pool,
            payload.product_id,
            payload.amount,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(StockOperationResponse { product, transaction })))
}

// ---
// Consulta ao livro-razão
// ---

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTransactionsQuery {
    pub product_id: Option<i64>,
    pub transaction_type: Option<TransactionType>,
    pub reference_type: Option<ReferenceType>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/inventory/transactions",
    tag = "Inventory",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Lançamentos do livro-razão", body = Paginated<InventoryTransaction>)
    )
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = TransactionFilter {
        product_id: query.product_id,
        transaction_type: query.transaction_type,
        reference_type: query.reference_type,
        created_from: query.created_from,
        created_to: query.created_to,
    };
    let pagination = Pagination {
        page: query.page,
        per_page: query.per_page,
    };

    let page = app_state
        .inventory_service
        .list_transactions(&filter, &pagination)
        .await?;

    Ok((StatusCode::OK, Json(page)))
}
