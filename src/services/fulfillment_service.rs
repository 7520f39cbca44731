// src/services/fulfillment_service.rs

use serde::Serialize;
use sqlx::{Acquire, Executor, Postgres};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::OperationsRepository,
    models::inventory::{
        InventoryTransaction, NewTransaction, OrderLine, ReferenceType, Shortage,
        TransactionType,
    },
    services::{
        availability_service::AvailabilityService, inventory_service::InventoryService,
    },
};

// Erros da reconciliação viajam como VALOR dentro do resultado, no formato
// {type, details}, para o chamador coletar todas as faltas de uma vez em
// vez de parar na primeira.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(
    tag = "type",
    content = "details",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ReconciliationError {
    InsufficientInventory(Shortage),
    OrderNotFound { order_id: i64 },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationOutcome {
    pub success: bool,
    pub transactions: Vec<InventoryTransaction>,
    pub errors: Vec<ReconciliationError>,
}

impl ReconciliationOutcome {
    fn failed(errors: Vec<ReconciliationError>) -> Self {
        Self {
            success: false,
            transactions: Vec::new(),
            errors,
        }
    }

    pub fn has_shortages(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, ReconciliationError::InsufficientInventory(_)))
    }

    pub fn shortages(&self) -> Vec<Shortage> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                ReconciliationError::InsufficientInventory(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct FulfillmentService {
    operations_repo: OperationsRepository,
    inventory_service: InventoryService,
    availability_service: AvailabilityService,
}

impl FulfillmentService {
    pub fn new(
        operations_repo: OperationsRepository,
        inventory_service: InventoryService,
        availability_service: AvailabilityService,
    ) -> Self {
        Self {
            operations_repo,
            inventory_service,
            availability_service,
        }
    }

    /// Traduz um pedido vendido em consumo de insumos: uma transação SALE por
    /// produto tocado, com livro-razão e saldo atualizados no MESMO escopo
    /// atômico. Falha no meio (ex.: violação de constraint em um produto)
    /// desfaz todas as baixas já tentadas para o pedido.
    ///
    /// Este serviço não rastreia "pedido já reconciliado": o disparo único na
    /// aresta de status é responsabilidade do OperationService.
    pub async fn reconcile<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        skip_inventory_check: bool,
    ) -> Result<ReconciliationOutcome, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Linhas do pedido. Pedido inexistente e pedido vazio sinalizam
        //    igual; quem precisar distinguir confere a existência antes.
        let items = self.operations_repo.list_order_items(&mut *tx, order_id).await?;
        if items.is_empty() {
            return Ok(ReconciliationOutcome::failed(vec![
                ReconciliationError::OrderNotFound { order_id },
            ]));
        }

        // 2. Necessidade agregada por produto, no mesmo escopo da escrita.
        let lines: Vec<OrderLine> = items
            .iter()
            .map(|item| OrderLine {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
            })
            .collect();
        let report = self.availability_service.resolve(&mut *tx, &lines).await?;

        // 3. Falta de estoque bloqueia, salvo override explícito do operador.
        if !report.is_valid {
            if !skip_inventory_check {
                return Ok(ReconciliationOutcome::failed(
                    report
                        .insufficient
                        .into_iter()
                        .map(ReconciliationError::InsufficientInventory)
                        .collect(),
                ));
            }
            // Saldo negativo aqui não é bug: é a válvula de escape manual.
            tracing::warn!(
                order_id,
                "⚠️ Baixa de estoque FORÇADA (skipInventoryCheck): o saldo poderá ficar negativo"
            );
        }

        // 4. Uma baixa por produto; qualquer erro desfaz as anteriores.
        let mut transactions = Vec::with_capacity(report.required.len());
        for req in &report.required {
            let (record, _) = self
                .inventory_service
                .record_transaction(
                    &mut *tx,
                    NewTransaction {
                        product_id: req.product_id,
                        transaction_type: TransactionType::Sale,
                        quantity_change: -req.required,
                        reference_type: Some(ReferenceType::Order),
                        reference_id: Some(order_id),
                        notes: Some(format!("Baixa automática do pedido #{order_id}")),
                    },
                )
                .await?;
            transactions.push(record);
        }

        tx.commit().await?;

        tracing::info!(
            order_id,
            products = transactions.len(),
            "Baixa de estoque concluída para o pedido"
        );
        Ok(ReconciliationOutcome {
            success: true,
            transactions,
            errors: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn falta() -> Shortage {
        Shortage {
            product_id: 3,
            product_name: "Farinha".to_string(),
            required: dec!(6),
            available: dec!(5),
            shortage: dec!(1),
        }
    }

    #[test]
    fn erro_serializa_como_tipo_e_detalhes() {
        let value =
            serde_json::to_value(ReconciliationError::InsufficientInventory(falta())).unwrap();
        assert_eq!(value["type"], "insufficient_inventory");
        assert_eq!(value["details"]["productId"], 3);
        assert_eq!(value["details"]["shortage"], 1.0);

        let value =
            serde_json::to_value(ReconciliationError::OrderNotFound { order_id: 7 }).unwrap();
        assert_eq!(value["type"], "order_not_found");
        assert_eq!(value["details"]["orderId"], 7);
    }

    #[test]
    fn resultado_distingue_falta_de_estoque_de_outros_erros() {
        let com_falta = ReconciliationOutcome::failed(vec![
            ReconciliationError::InsufficientInventory(falta()),
        ]);
        assert!(com_falta.has_shortages());
        assert_eq!(com_falta.shortages().len(), 1);
        assert_eq!(com_falta.shortages()[0].shortage, dec!(1));

        let sem_itens =
            ReconciliationOutcome::failed(vec![ReconciliationError::OrderNotFound {
                order_id: 9,
            }]);
        assert!(!sem_itens.has_shortages());
        assert!(sem_itens.shortages().is_empty());
    }
}
