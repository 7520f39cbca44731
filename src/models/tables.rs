// src/models/tables.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Cadastro físico das mesas. Estado de ocupação não é controlado aqui.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantTable {
    pub id: i64,
    #[schema(example = 12)]
    pub number: i32,
    #[schema(example = "Varanda")]
    pub label: Option<String>,
    #[schema(example = 4)]
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
