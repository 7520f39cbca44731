// src/models/operations.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Máquina de estados do pedido ---
// PENDING -> PREPARING -> SERVED -> PAID, com cancelamento enquanto
// o pedido ainda não foi servido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Estados em que o pedido já foi cumprido (a baixa de estoque já ocorreu).
    pub fn is_fulfillment(self) -> bool {
        matches!(self, OrderStatus::Served | OrderStatus::Paid)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Pending, OrderStatus::Preparing)
            | (OrderStatus::Pending, OrderStatus::Served)
            | (OrderStatus::Pending, OrderStatus::Paid)
            | (OrderStatus::Pending, OrderStatus::Cancelled)
            | (OrderStatus::Preparing, OrderStatus::Served)
            | (OrderStatus::Preparing, OrderStatus::Paid)
            | (OrderStatus::Preparing, OrderStatus::Cancelled)
            | (OrderStatus::Served, OrderStatus::Paid) => true,
            _ => false,
        }
    }

    /// A reconciliação de estoque dispara exatamente na ARESTA de entrada
    /// em um estado de cumprimento. SERVED -> PAID não dispara de novo:
    /// essa é a garantia de "exatamente uma vez" no nível do chamador.
    pub fn enters_fulfillment(self, next: OrderStatus) -> bool {
        next.is_fulfillment() && !self.is_fulfillment()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub table_id: Option<i64>,
    pub status: OrderStatus,
    #[schema(example = "90.00")]
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "45.00")]
    pub unit_price: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn fluxo_normal_e_permitido() {
        assert!(Pending.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Served));
        assert!(Served.can_transition_to(Paid));
        // Atalhos do balcão: servir ou pagar direto.
        assert!(Pending.can_transition_to(Served));
        assert!(Preparing.can_transition_to(Paid));
    }

    #[test]
    fn estados_terminais_nao_transicionam() {
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Served));
        assert!(!Cancelled.can_transition_to(Preparing));
        assert!(!Served.can_transition_to(Cancelled));
        // Repetir o mesmo status nunca é uma transição válida.
        assert!(!Served.can_transition_to(Served));
    }

    #[test]
    fn baixa_dispara_somente_na_aresta_de_entrada() {
        assert!(Pending.enters_fulfillment(Served));
        assert!(Pending.enters_fulfillment(Paid));
        assert!(Preparing.enters_fulfillment(Served));
        // SERVED -> PAID não pode deduzir estoque pela segunda vez.
        assert!(!Served.enters_fulfillment(Paid));
        assert!(!Pending.enters_fulfillment(Preparing));
        assert!(!Preparing.enters_fulfillment(Cancelled));
    }
}
