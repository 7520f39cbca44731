// src/handlers/operations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{Paginated, Pagination},
    },
    config::AppState,
    models::{
        inventory::AvailabilityReport,
        operations::{Order, OrderDetail, OrderItem, OrderStatus},
    },
    services::fulfillment_service::ReconciliationOutcome,
};

// ---
// Payload: CreateOrder
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub table_id: Option<i64>,

    #[validate(length(max = 500, message = "As observações devem ter no máximo 500 caracteres."))]
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Operations",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado", body = Order),
        (status = 404, description = "Mesa não encontrada")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state
        .operation_service
        .create_order(&app_state.db_pool, payload.table_id, payload.notes.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Operations",
    params(ListOrdersQuery),
    responses((status = 200, description = "Pedidos", body = Paginated<Order>))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination {
        page: query.page,
        per_page: query.per_page,
    };

    let page = app_state
        .operation_service
        .list_orders(query.status, &pagination)
        .await?;

    Ok((StatusCode::OK, Json(page)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "Operations",
    params(("order_id" = i64, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com itens", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.operation_service.get_order_detail(order_id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

// ---
// Payload: AddOrderItem
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOrderItemPayload {
    #[validate(range(min = 1, message = "O item de cardápio deve ser um id positivo."))]
    pub menu_item_id: i64,

    #[validate(range(min = 1, message = "A quantidade deve ser de pelo menos 1 porção."))]
    pub quantity: i32,

    #[validate(length(max = 500, message = "As observações devem ter no máximo 500 caracteres."))]
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/items",
    tag = "Operations",
    request_body = AddOrderItemPayload,
    params(("order_id" = i64, Path, description = "ID do pedido")),
    responses(
        (status = 201, description = "Item adicionado ao pedido", body = OrderItem),
        (status = 422, description = "Pedido já fechado")
    )
)]
pub async fn add_order_item(
    State(app_state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(payload): Json<AddOrderItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .operation_service
        .add_item(
            &app_state.db_pool,
            order_id,
            payload.menu_item_id,
            payload.quantity,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

// ---
// Transição de status (com baixa de estoque na aresta SERVED/PAID)
// ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOrderPayload {
    pub status: OrderStatus,

    /// Válvula de escape do operador: segue mesmo sem estoque suficiente,
    /// podendo deixar o saldo negativo.
    #[serde(default)]
    pub skip_inventory_check: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOrderResponse {
    pub order: Order,
    /// Presente apenas quando a transição disparou a reconciliação.
    pub inventory: Option<ReconciliationOutcome>,
}

#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/status",
    tag = "Operations",
    request_body = TransitionOrderPayload,
    params(("order_id" = i64, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Status atualizado", body = TransitionOrderResponse),
        (status = 409, description = "Estoque insuficiente; transição rejeitada"),
        (status = 422, description = "Transição de status inválida")
    )
)]
pub async fn transition_order(
    State(app_state): State<AppState>,
    Path(order_id): Path<i64>,
    Json(payload): Json<TransitionOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (order, inventory) = app_state
        .operation_service
        .transition_order(
            &app_state.db_pool,
            order_id,
            payload.status,
            payload.skip_inventory_check,
        )
        .await?;

    Ok((StatusCode::OK, Json(TransitionOrderResponse { order, inventory })))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}/availability",
    tag = "Operations",
    params(("order_id" = i64, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Checagem de disponibilidade (dry-run)", body = AvailabilityReport),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn check_availability(
    State(app_state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .operation_service
        .check_availability(&app_state.db_pool, order_id)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}
