// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::{
        error::AppError,
        pagination::{Paginated, Pagination},
    },
    db::{InventoryRepository, TransactionFilter},
    models::inventory::{
        InventoryTransaction, NewTransaction, Product, Shortage, TransactionType,
    },
};

const MAX_NOTES_LEN: usize = 1000;

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    // ---
    // Primitivo do livro-razão
    // ---

    /// Valida os campos do lançamento ANTES de qualquer escrita,
    /// acumulando todas as violações (não só a primeira).
    fn validate_transaction(new_tx: &NewTransaction) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();

        if new_tx.product_id <= 0 {
            errors.add(
                "productId".into(),
                field_error("range", "O produto deve ser um id positivo."),
            );
        }
        if new_tx.quantity_change.is_zero() {
            errors.add(
                "quantityChange".into(),
                field_error("range", "A variação de quantidade não pode ser zero."),
            );
        }
        match (new_tx.reference_type, new_tx.reference_id) {
            (Some(_), None) => errors.add(
                "referenceId".into(),
                field_error(
                    "required",
                    "referenceId é obrigatório quando referenceType é informado.",
                ),
            ),
            (_, Some(id)) if id <= 0 => errors.add(
                "referenceId".into(),
                field_error("range", "referenceId deve ser um inteiro positivo."),
            ),
            _ => {}
        }
        if let Some(notes) = &new_tx.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                errors.add(
                    "notes".into(),
                    field_error("length", "As observações devem ter no máximo 1000 caracteres."),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(errors))
        }
    }

    /// Monta o lançamento de reposição. O sinal do valor informado é
    /// normalizado: reposição sempre AUMENTA o estoque.
    fn restock_transaction(
        product_id: i64,
        amount: Decimal,
        notes: Option<&str>,
    ) -> NewTransaction {
        NewTransaction {
            product_id,
            transaction_type: TransactionType::Restock,
            quantity_change: amount.abs(),
            reference_type: None,
            reference_id: None,
            notes: notes.map(str::to_owned),
        }
    }

    /// Perda/descarte sempre DIMINUI o estoque, qualquer que seja o sinal
    /// do valor informado.
    fn waste_transaction(product_id: i64, amount: Decimal, notes: Option<&str>) -> NewTransaction {
        NewTransaction {
            product_id,
            transaction_type: TransactionType::Waste,
            quantity_change: -amount.abs(),
            reference_type: None,
            reference_id: None,
            notes: notes.map(str::to_owned),
        }
    }

    /// Grava a linha imutável do livro-razão E aplica o delta no saldo do
    /// produto como UM único efeito atômico: os dois confirmam juntos ou
    /// nenhum. Este primitivo NÃO impõe não-negatividade; quem chama decide
    /// se saldo negativo é aceitável.
    pub async fn record_transaction<'e, E>(
        &self,
        executor: E,
        new_tx: NewTransaction,
    ) -> Result<(InventoryTransaction, Product), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        Self::validate_transaction(&new_tx)?;

        let mut tx = executor.begin().await?;

        let record = self.inventory_repo.insert_transaction(&mut *tx, &new_tx).await?;
        let product = self
            .inventory_repo
            .apply_quantity_delta(&mut *tx, new_tx.product_id, new_tx.quantity_change)
            .await?
            .ok_or(AppError::ProductNotFound(new_tx.product_id))?;

        tx.commit().await?;
        Ok((record, product))
    }

    // ---
    // Operações manuais do operador
    // ---

    pub async fn restock<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        amount: Decimal,
        notes: Option<&str>,
    ) -> Result<(InventoryTransaction, Product), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if amount.is_zero() {
            let mut errors = ValidationErrors::new();
            errors.add(
                "amount".into(),
                field_error("range", "O valor da reposição não pode ser zero."),
            );
            return Err(errors.into());
        }

        self.record_transaction(executor, Self::restock_transaction(product_id, amount, notes))
            .await
    }

    /// Ajuste manual (qualquer sinal). A guarda de não-negatividade fica
    /// AQUI, com a linha do produto travada, porque o primitivo não a impõe.
    pub async fn adjust<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        delta: Decimal,
        notes: Option<&str>,
    ) -> Result<(InventoryTransaction, Product), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if delta.is_zero() {
            let mut errors = ValidationErrors::new();
            errors.add(
                "delta".into(),
                field_error("range", "O delta do ajuste não pode ser zero."),
            );
            return Err(errors.into());
        }

        let mut tx = executor.begin().await?;

        let product = self
            .inventory_repo
            .get_product_for_update(&mut *tx, product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;

        let resulting = product.current_quantity + delta;
        if resulting < Decimal::ZERO {
            return Err(AppError::InsufficientInventory(vec![Shortage {
                product_id,
                product_name: product.name,
                required: delta.abs(),
                available: product.current_quantity,
                shortage: -resulting,
            }]));
        }

        let result = self
            .record_transaction(
                &mut *tx,
                NewTransaction {
                    product_id,
                    transaction_type: TransactionType::Adjustment,
                    quantity_change: delta,
                    reference_type: None,
                    reference_id: None,
                    notes: notes.map(str::to_owned),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(result)
    }

    pub async fn record_waste<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        amount: Decimal,
        notes: Option<&str>,
    ) -> Result<(InventoryTransaction, Product), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if amount.is_zero() {
            let mut errors = ValidationErrors::new();
            errors.add(
                "amount".into(),
                field_error("range", "A quantidade perdida não pode ser zero."),
            );
            return Err(errors.into());
        }

        let mut tx = executor.begin().await?;

        let product = self
            .inventory_repo
            .get_product_for_update(&mut *tx, product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))?;

        let new_tx = Self::waste_transaction(product_id, amount, notes);
        let resulting = product.current_quantity + new_tx.quantity_change;
        if resulting < Decimal::ZERO {
            return Err(AppError::InsufficientInventory(vec![Shortage {
                product_id,
                product_name: product.name,
                required: amount.abs(),
                available: product.current_quantity,
                shortage: -resulting,
            }]));
        }

        let result = self.record_transaction(&mut *tx, new_tx).await?;

        tx.commit().await?;
        Ok(result)
    }

    // ---
    // Cadastro de produtos
    // ---

    /// Cria o produto. A carga inicial de estoque entra pelo livro-razão,
    /// nunca por escrita direta de saldo.
    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        name: &str,
        unit: &str,
        initial_quantity: Decimal,
        low_stock_threshold: Decimal,
        cost_per_unit: Option<Decimal>,
        supplier: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let mut product = self
            .inventory_repo
            .create_product(&mut *tx, name, unit, low_stock_threshold, cost_per_unit, supplier)
            .await?;

        if !initial_quantity.is_zero() {
            let (_, updated) = self
                .record_transaction(
                    &mut *tx,
                    NewTransaction {
                        product_id: product.id,
                        transaction_type: TransactionType::Adjustment,
                        quantity_change: initial_quantity,
                        reference_type: None,
                        reference_id: None,
                        notes: Some("Carga inicial de estoque".to_string()),
                    },
                )
                .await?;
            product = updated;
        }

        tx.commit().await?;
        Ok(product)
    }

    pub async fn get_product(&self, product_id: i64) -> Result<Product, AppError> {
        self.inventory_repo
            .get_product(product_id)
            .await?
            .ok_or(AppError::ProductNotFound(product_id))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.inventory_repo.list_products().await
    }

    pub async fn list_low_stock(&self) -> Result<Vec<Product>, AppError> {
        self.inventory_repo.list_low_stock().await
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        name: &str,
        unit: &str,
        low_stock_threshold: Decimal,
        cost_per_unit: Option<Decimal>,
        supplier: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo
            .update_product(
                executor,
                product_id,
                name,
                unit,
                low_stock_threshold,
                cost_per_unit,
                supplier,
            )
            .await?
            .ok_or(AppError::ProductNotFound(product_id))
    }

    pub async fn delete_product<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo.delete_product(executor, product_id).await
    }

    // ---
    // Consultas ao livro-razão
    // ---

    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        pagination: &Pagination,
    ) -> Result<Paginated<InventoryTransaction>, AppError> {
        let (data, total) = self.inventory_repo.list_transactions(filter, pagination).await?;
        Ok(Paginated::new(data, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inventory::ReferenceType;
    use rust_decimal_macros::dec;

    fn base_tx() -> NewTransaction {
        NewTransaction {
            product_id: 1,
            transaction_type: TransactionType::Restock,
            quantity_change: dec!(5),
            reference_type: None,
            reference_id: None,
            notes: None,
        }
    }

    #[test]
    fn lancamento_valido_passa() {
        assert!(InventoryService::validate_transaction(&base_tx()).is_ok());

        let com_referencia = NewTransaction {
            reference_type: Some(ReferenceType::Order),
            reference_id: Some(42),
            notes: Some("x".repeat(1000)),
            ..base_tx()
        };
        assert!(InventoryService::validate_transaction(&com_referencia).is_ok());
    }

    #[test]
    fn validacao_acumula_todas_as_violacoes() {
        let invalido = NewTransaction {
            product_id: 0,
            quantity_change: Decimal::ZERO,
            reference_type: Some(ReferenceType::Order),
            reference_id: None,
            notes: Some("x".repeat(1001)),
            ..base_tx()
        };

        let err = InventoryService::validate_transaction(&invalido).unwrap_err();
        let AppError::ValidationError(errors) = err else {
            panic!("esperava erro de validação");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("productId"));
        assert!(fields.contains_key("quantityChange"));
        assert!(fields.contains_key("referenceId"));
        assert!(fields.contains_key("notes"));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn referencia_sem_tipo_exige_id_positivo() {
        let invalido = NewTransaction {
            reference_type: Some(ReferenceType::Manual),
            reference_id: Some(-3),
            ..base_tx()
        };
        let err = InventoryService::validate_transaction(&invalido).unwrap_err();
        let AppError::ValidationError(errors) = err else {
            panic!("esperava erro de validação");
        };
        assert!(errors.field_errors().contains_key("referenceId"));
    }

    #[test]
    fn reposicao_normaliza_o_sinal() {
        // restock(-25) guarda +25 no livro-razão.
        let tx = InventoryService::restock_transaction(1, dec!(-25), None);
        assert_eq!(tx.quantity_change, dec!(25));
        assert_eq!(tx.transaction_type, TransactionType::Restock);

        let tx = InventoryService::restock_transaction(1, dec!(25), None);
        assert_eq!(tx.quantity_change, dec!(25));
    }

    #[test]
    fn perda_sempre_deduz() {
        let tx = InventoryService::waste_transaction(1, dec!(3.5), Some("queda na cozinha"));
        assert_eq!(tx.quantity_change, dec!(-3.5));
        assert_eq!(tx.transaction_type, TransactionType::Waste);

        let tx = InventoryService::waste_transaction(1, dec!(-3.5), None);
        assert_eq!(tx.quantity_change, dec!(-3.5));
    }
}
