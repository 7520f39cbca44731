// src/db/tables_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::tables::RestaurantTable};

#[derive(Clone)]
pub struct TablesRepository {
    pool: PgPool,
}

impl TablesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_table<'e, E>(
        &self,
        executor: E,
        number: i32,
        label: Option<&str>,
        capacity: i32,
    ) -> Result<RestaurantTable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RestaurantTable>(
            r#"
            INSERT INTO restaurant_tables (number, label, capacity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(number)
        .bind(label)
        .bind(capacity)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NameAlreadyExists(format!("mesa {number}"));
                }
            }
            e.into()
        })
    }

    pub async fn list_tables(&self) -> Result<Vec<RestaurantTable>, AppError> {
        let tables = sqlx::query_as::<_, RestaurantTable>(
            "SELECT * FROM restaurant_tables ORDER BY number ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    pub async fn update_table<'e, E>(
        &self,
        executor: E,
        table_id: i64,
        number: i32,
        label: Option<&str>,
        capacity: i32,
    ) -> Result<Option<RestaurantTable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RestaurantTable>(
            r#"
            UPDATE restaurant_tables
            SET number = $2, label = $3, capacity = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(table_id)
        .bind(number)
        .bind(label)
        .bind(capacity)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NameAlreadyExists(format!("mesa {number}"));
                }
            }
            e.into()
        })
    }

    pub async fn delete_table<'e, E>(&self, executor: E, table_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM restaurant_tables WHERE id = $1")
            .bind(table_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::TableNotFound(table_id));
        }
        Ok(())
    }
}
