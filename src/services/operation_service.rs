// src/services/operation_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        pagination::{Paginated, Pagination},
    },
    db::OperationsRepository,
    models::{
        inventory::{AvailabilityReport, OrderLine},
        operations::{Order, OrderDetail, OrderItem, OrderStatus},
    },
    services::{
        availability_service::AvailabilityService,
        fulfillment_service::{FulfillmentService, ReconciliationOutcome},
    },
};

#[derive(Clone)]
pub struct OperationService {
    repo: OperationsRepository,
    fulfillment_service: FulfillmentService,
    availability_service: AvailabilityService,
}

impl OperationService {
    pub fn new(
        repo: OperationsRepository,
        fulfillment_service: FulfillmentService,
        availability_service: AvailabilityService,
    ) -> Self {
        Self {
            repo,
            fulfillment_service,
            availability_service,
        }
    }

    // --- PEDIDOS ---

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        table_id: Option<i64>,
        notes: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_order(executor, table_id, notes).await
    }

    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        pagination: &Pagination,
    ) -> Result<Paginated<Order>, AppError> {
        let (data, total) = self.repo.list_orders(status, pagination).await?;
        Ok(Paginated::new(data, total, pagination))
    }

    pub async fn get_order_detail(&self, order_id: i64) -> Result<OrderDetail, AppError> {
        self.repo
            .get_order_detail(order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))
    }

    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        menu_item_id: i64,
        quantity: i32,
        notes: Option<&str>,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))?;

        // Depois da baixa de estoque (ou do cancelamento) o pedido congela:
        // um item incluído agora nunca passaria pela reconciliação.
        if order.status.is_fulfillment() || order.status == OrderStatus::Cancelled {
            return Err(AppError::OrderAlreadyClosed(order_id));
        }

        let item = self
            .repo
            .add_order_item(&mut *tx, order_id, menu_item_id, quantity, notes)
            .await?;
        self.repo.recalculate_order_total(&mut *tx, order_id).await?;

        tx.commit().await?;
        Ok(item)
    }

    // --- TRANSIÇÃO ---

    /// Muda o status do pedido. Na ARESTA de entrada em SERVED/PAID (e só
    /// nela) a reconciliação de estoque roda, dentro da mesma transação que
    /// grava o novo status:
    /// - falta de estoque rejeita a transição inteira (nada é gravado);
    /// - qualquer outra falha da reconciliação é registrada e a transição
    ///   segue — decisão de produto: só erro de estoque bloqueia o salão.
    pub async fn transition_order<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        new_status: OrderStatus,
        skip_inventory_check: bool,
    ) -> Result<(Order, Option<ReconciliationOutcome>), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // FOR UPDATE: transições concorrentes do mesmo pedido serializam
        // aqui, então a aresta de cumprimento só é vista por uma delas.
        let order = self
            .repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))?;

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::InvalidStatusTransition {
                from: order.status,
                to: new_status,
            });
        }

        let mut outcome = None;
        if order.status.enters_fulfillment(new_status) {
            let result = self
                .fulfillment_service
                .reconcile(&mut *tx, order_id, skip_inventory_check)
                .await?;

            if result.has_shortages() {
                return Err(AppError::InsufficientInventory(result.shortages()));
            }
            if !result.success {
                tracing::warn!(
                    order_id,
                    errors = ?result.errors,
                    "Baixa de estoque não executada; transição de status mantida"
                );
            }
            outcome = Some(result);
        }

        let closed_at = new_status.is_terminal().then(Utc::now);
        let updated = self
            .repo
            .update_order_status(&mut *tx, order_id, new_status, closed_at)
            .await?;

        tx.commit().await?;
        Ok((updated, outcome))
    }

    /// Dry-run do resolvedor para um pedido: mesma conta da reconciliação,
    /// zero efeito colateral.
    pub async fn check_availability<'e, E>(
        &self,
        executor: E,
        order_id: i64,
    ) -> Result<AvailabilityReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if self.repo.get_order(order_id).await?.is_none() {
            return Err(AppError::OrderNotFound(order_id));
        }

        let mut tx = executor.begin().await?;

        let items = self.repo.list_order_items(&mut *tx, order_id).await?;
        let lines: Vec<OrderLine> = items
            .iter()
            .map(|item| OrderLine {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
            })
            .collect();
        let report = self.availability_service.resolve(&mut *tx, &lines).await?;

        tx.commit().await?;
        Ok(report)
    }
}
