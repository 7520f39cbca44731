// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- 1. Produto (unidade de estoque) ---
// O saldo corrente (current_quantity) é um cache materializado do livro-razão:
// só muda junto com a gravação de uma InventoryTransaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[schema(example = "Farinha de trigo")]
    pub name: String,
    #[schema(example = "kg")]
    pub unit: String,
    #[schema(example = "100.0")]
    pub current_quantity: Decimal,
    #[schema(example = "10.0")]
    pub low_stock_threshold: Decimal,
    pub cost_per_unit: Option<Decimal>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Tipos fechados do livro-razão ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum TransactionType {
    Sale,       // Vira "SALE"
    Restock,    // Vira "RESTOCK"
    Adjustment, // Vira "ADJUSTMENT"
    Waste,      // Vira "WASTE"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reference_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    Order,
    Manual,
    Recipe,
}

// --- 3. Lançamento do livro-razão (imutável) ---
// Convenção de sinal: positivo = estoque aumenta, negativo = estoque diminui.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTransaction {
    pub id: i64,
    pub product_id: i64,
    pub transaction_type: TransactionType,
    #[schema(example = "-1.0")]
    pub quantity_change: Decimal,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dados de entrada do primitivo de gravação do livro-razão.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub product_id: i64,
    pub transaction_type: TransactionType,
    pub quantity_change: Decimal,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<i64>,
    pub notes: Option<String>,
}

// --- 4. Vínculo insumo de receita -> produto ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientProductLink {
    pub id: i64,
    pub recipe_ingredient_id: i64,
    pub product_id: i64,
    #[schema(example = "0.5")]
    pub quantity_per_serving: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Tupla de conversão resolvida pelo join
/// item de cardápio -> receita -> insumos -> vínculos -> produtos.
#[derive(Debug, Clone, FromRow)]
pub struct ConversionTuple {
    pub product_id: i64,
    pub product_name: String,
    pub quantity_per_serving: Decimal,
}

// --- 5. Resultado do resolvedor de disponibilidade ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequiredProduct {
    pub product_id: i64,
    pub product_name: String,
    pub required: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shortage {
    pub product_id: i64,
    pub product_name: String,
    pub required: Decimal,
    pub available: Decimal,
    pub shortage: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    /// Necessidade agregada, ordenada por produto.
    pub required: Vec<RequiredProduct>,
    /// Um registro por produto em falta (todos, não só o primeiro).
    pub insufficient: Vec<Shortage>,
    pub is_valid: bool,
}

/// Linha de pedido na forma que o resolvedor consome.
#[derive(Debug, Clone, Copy)]
pub struct OrderLine {
    pub menu_item_id: i64,
    pub quantity: i32,
}
