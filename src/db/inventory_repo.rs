// src/db/inventory_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{
        error::AppError,
        pagination::Pagination,
    },
    models::inventory::{
        ConversionTuple, InventoryTransaction, NewTransaction, Product, ReferenceType,
        TransactionType,
    },
};

/// Filtros da consulta ao livro-razão. Campos `None` não filtram.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    pub product_id: Option<i64>,
    pub transaction_type: Option<TransactionType>,
    pub reference_type: Option<ReferenceType>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---
    // Leituras simples usam a pool principal.

    pub async fn get_product(&self, product_id: i64) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Produtos no limite ou abaixo do alerta de estoque baixo.
    pub async fn list_low_stock(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE current_quantity <= low_stock_threshold ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Busca com trava de linha (FOR UPDATE), para leituras que antecedem
    /// uma escrita dependente do saldo dentro da mesma transação.
    pub async fn get_product_for_update<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(executor)
                .await?;
        Ok(product)
    }

    pub async fn get_products_by_ids<'e, E>(
        &self,
        executor: E,
        product_ids: &[i64],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
                .bind(product_ids)
                .fetch_all(executor)
                .await?;
        Ok(products)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        name: &str,
        unit: &str,
        low_stock_threshold: Decimal,
        cost_per_unit: Option<Decimal>,
        supplier: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, unit, low_stock_threshold, cost_per_unit, supplier)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(unit)
        .bind(low_stock_threshold)
        .bind(cost_per_unit)
        .bind(supplier)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    /// Atualiza o cadastro do produto. A quantidade em estoque fica de fora
    /// de propósito: saldo só muda via livro-razão.
    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        name: &str,
        unit: &str,
        low_stock_threshold: Decimal,
        cost_per_unit: Option<Decimal>,
        supplier: Option<&str>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, unit = $3, low_stock_threshold = $4,
                cost_per_unit = $5, supplier = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(name)
        .bind(unit)
        .bind(low_stock_threshold)
        .bind(cost_per_unit)
        .bind(supplier)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn delete_product<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    // Produto referenciado por lançamentos ou vínculos de receita.
                    if db_err.is_foreign_key_violation() {
                        return AppError::DeleteRestricted;
                    }
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::ProductNotFound(product_id));
        }
        Ok(())
    }

    // ---
    // Livro-razão
    // ---

    /// Insere a linha imutável do livro-razão. Nunca chamar isoladamente:
    /// o saldo do produto precisa ser aplicado na mesma transação
    /// (ver InventoryService::record_transaction).
    pub async fn insert_transaction<'e, E>(
        &self,
        executor: E,
        new_tx: &NewTransaction,
    ) -> Result<InventoryTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InventoryTransaction>(
            r#"
            INSERT INTO inventory_transactions
                (product_id, transaction_type, quantity_change, reference_type, reference_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new_tx.product_id)
        .bind(new_tx.transaction_type)
        .bind(new_tx.quantity_change)
        .bind(new_tx.reference_type)
        .bind(new_tx.reference_id)
        .bind(new_tx.notes.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ProductNotFound(new_tx.product_id);
                }
            }
            e.into()
        })
    }

    /// Aplica o delta no saldo materializado como expressão relativa avaliada
    /// pelo próprio banco. Isso evita o "lost update" do padrão
    /// ler-calcular-gravar sob concorrência.
    pub async fn apply_quantity_delta<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        delta: Decimal,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET current_quantity = current_quantity + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<InventoryTransaction>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM inventory_transactions
            WHERE ($1::BIGINT IS NULL OR product_id = $1)
              AND ($2::transaction_type IS NULL OR transaction_type = $2)
              AND ($3::reference_type IS NULL OR reference_type = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.transaction_type)
        .bind(filter.reference_type)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .fetch_one(&self.pool)
        .await?;

        let transactions = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT * FROM inventory_transactions
            WHERE ($1::BIGINT IS NULL OR product_id = $1)
              AND ($2::transaction_type IS NULL OR transaction_type = $2)
              AND ($3::reference_type IS NULL OR reference_type = $3)
              AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
            ORDER BY created_at DESC, id DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.transaction_type)
        .bind(filter.reference_type)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((transactions, total))
    }

    // ---
    // Mapa insumo -> produto (lado de leitura)
    // ---

    /// Expande um item de cardápio nas tuplas (produto, quantidade por porção).
    /// Item sem receita ou sem vínculos devolve lista vazia, não erro.
    pub async fn get_menu_item_conversions<'e, E>(
        &self,
        executor: E,
        menu_item_id: i64,
    ) -> Result<Vec<ConversionTuple>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tuples = sqlx::query_as::<_, ConversionTuple>(
            r#"
            SELECT rip.product_id, p.name AS product_name, rip.quantity_per_serving
            FROM menu_items mi
            JOIN recipes r ON r.id = mi.recipe_id
            JOIN recipe_ingredients ri ON ri.recipe_id = r.id
            JOIN recipe_ingredient_products rip ON rip.recipe_ingredient_id = ri.id
            JOIN products p ON p.id = rip.product_id
            WHERE mi.id = $1
            ORDER BY rip.product_id ASC
            "#,
        )
        .bind(menu_item_id)
        .fetch_all(executor)
        .await?;
        Ok(tuples)
    }
}
