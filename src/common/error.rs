// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::{inventory::Shortage, operations::OrderStatus};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// A taxonomia segue o motor de estoque: validação, falta de estoque,
// referências inexistentes e falhas do banco.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Falta de estoque é um resultado de primeira classe: carrega a lista
    // completa de produtos em falta, não só o primeiro.
    #[error("Estoque insuficiente")]
    InsufficientInventory(Vec<Shortage>),

    #[error("Pedido {0} não encontrado ou sem itens")]
    OrderNotFound(i64),

    #[error("Produto {0} não encontrado")]
    ProductNotFound(i64),

    #[error("Item de cardápio {0} não encontrado")]
    MenuItemNotFound(i64),

    #[error("Receita {0} não encontrada")]
    RecipeNotFound(i64),

    #[error("Mesa {0} não encontrada")]
    TableNotFound(i64),

    // Vínculo insumo->produto apontando para registro inexistente.
    #[error("Vínculo inválido: {0}")]
    LinkNotFound(String),

    #[error("Nome já cadastrado: {0}")]
    NameAlreadyExists(String),

    #[error("Vínculo já cadastrado para este insumo e produto")]
    LinkAlreadyExists,

    #[error("Registro referenciado por outros dados; exclusão bloqueada")]
    DeleteRestricted,

    #[error("Transição de status inválida: {from:?} -> {to:?}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Pedido {0} já fechado; itens não podem mais ser alterados")]
    OrderAlreadyClosed(i64),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // Enumera cada produto em falta com os números prontos para exibição.
            AppError::InsufficientInventory(shortages) => {
                let body = Json(json!({
                    "error": "Estoque insuficiente para completar a operação.",
                    "details": shortages,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::OrderNotFound(_)
            | AppError::ProductNotFound(_)
            | AppError::MenuItemNotFound(_)
            | AppError::RecipeNotFound(_)
            | AppError::TableNotFound(_)
            | AppError::LinkNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),

            AppError::NameAlreadyExists(_)
            | AppError::LinkAlreadyExists
            | AppError::DeleteRestricted => (StatusCode::CONFLICT, self.to_string()),

            AppError::InvalidStatusTransition { .. } | AppError::OrderAlreadyClosed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` registra a mensagem detalhada; o cliente vê algo genérico.
            e => {
                tracing::error!("Erro interno do servidor: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
