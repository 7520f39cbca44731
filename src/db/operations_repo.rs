// src/db/operations_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{error::ErrorKind, Executor, PgPool, Postgres};

use crate::{
    common::{error::AppError, pagination::Pagination},
    models::operations::{Order, OrderDetail, OrderItem, OrderStatus},
};

#[derive(Clone)]
pub struct OperationsRepository {
    pool: PgPool,
}

impl OperationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PEDIDOS
    // =========================================================================

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        table_id: Option<i64>,
        notes: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Order>(
            "INSERT INTO orders (table_id, notes) VALUES ($1, $2) RETURNING *",
        )
        .bind(table_id)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::TableNotFound(table_id.unwrap_or_default());
                }
            }
            e.into()
        })
    }

    pub async fn get_order(&self, order_id: i64) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    /// Trava a linha do pedido: transições concorrentes sobre o mesmo pedido
    /// serializam aqui, o que sustenta o disparo único da baixa de estoque.
    pub async fn get_order_for_update<'e, E>(
        &self,
        executor: E,
        order_id: i64,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        pagination: &Pagination,
    ) -> Result<(Vec<Order>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE ($1::order_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::order_status IS NULL OR status = $1)
            ORDER BY opened_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((orders, total))
    }

    pub async fn get_order_detail(&self, order_id: i64) -> Result<Option<OrderDetail>, AppError> {
        let Some(header) = self.get_order(order_id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderDetail { header, items }))
    }

    // =========================================================================
    //  ITENS DO PEDIDO
    // =========================================================================

    /// O preço unitário é congelado no momento da inclusão, via subquery,
    /// para o total do pedido não flutuar com o cardápio.
    pub async fn add_order_item<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        menu_item_id: i64,
        quantity: i32,
        notes: Option<&str>,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price, notes)
            VALUES ($1, $2, $3, (SELECT price FROM menu_items WHERE id = $2), $4)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(menu_item_id)
        .bind(quantity)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                match db_err.kind() {
                    // Subquery de preço vazia: item de cardápio inexistente.
                    ErrorKind::NotNullViolation => {
                        return AppError::MenuItemNotFound(menu_item_id);
                    }
                    ErrorKind::ForeignKeyViolation => {
                        let constraint = db_err.constraint().unwrap_or_default();
                        if constraint.contains("menu_item") {
                            return AppError::MenuItemNotFound(menu_item_id);
                        }
                        return AppError::OrderNotFound(order_id);
                    }
                    _ => {}
                }
            }
            e.into()
        })
    }

    pub async fn list_order_items<'e, E>(
        &self,
        executor: E,
        order_id: i64,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Recalcula e atualiza o total em UMA única query.
    pub async fn recalculate_order_total<'e, E>(
        &self,
        executor: E,
        order_id: i64,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE orders
            SET total_amount = (
                SELECT COALESCE(SUM(quantity * unit_price), 0)
                FROM order_items
                WHERE order_items.order_id = orders.id
            ),
            updated_at = NOW()
            WHERE id = $1
            RETURNING total_amount
            "#,
        )
        .bind(order_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    pub async fn update_order_status<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        new_status: OrderStatus,
        closed_at: Option<DateTime<Utc>>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2, closed_at = COALESCE($3, closed_at), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(new_status)
        .bind(closed_at)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }
}
