// src/services/availability_service.rs

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::inventory::{
        AvailabilityReport, ConversionTuple, OrderLine, RequiredProduct, Shortage,
    },
};

#[derive(Clone)]
pub struct AvailabilityService {
    inventory_repo: InventoryRepository,
}

impl AvailabilityService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    /// Passo de leitura pura: expande as linhas do pedido em necessidade por
    /// produto (via mapa insumo -> produto) e compara com o saldo corrente.
    /// Não muta nada e pode ser chamado quantas vezes for preciso — serve
    /// tanto ao dry-run do endpoint de disponibilidade quanto à checagem
    /// interna da reconciliação.
    pub async fn resolve<'e, E>(
        &self,
        executor: E,
        lines: &[OrderLine],
    ) -> Result<AvailabilityReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação só de leitura: necessidade e saldo saem do mesmo snapshot.
        let mut tx = executor.begin().await?;

        let mut required: BTreeMap<i64, RequiredProduct> = BTreeMap::new();
        for line in lines {
            let conversions = self
                .inventory_repo
                .get_menu_item_conversions(&mut *tx, line.menu_item_id)
                .await?;
            // Item sem receita/vínculo devolve lista vazia e não contribui.
            accumulate(&mut required, &conversions, line.quantity);
        }

        let product_ids: Vec<i64> = required.keys().copied().collect();
        let stock: Vec<(i64, Decimal)> = if product_ids.is_empty() {
            Vec::new()
        } else {
            self.inventory_repo
                .get_products_by_ids(&mut *tx, &product_ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p.current_quantity))
                .collect()
        };

        tx.commit().await?;

        Ok(build_report(required, &stock))
    }
}

/// Acumula `quantity_per_serving * porções` por produto. Linhas diferentes
/// que tocam o mesmo produto SOMAM, nunca sobrescrevem.
fn accumulate(
    required: &mut BTreeMap<i64, RequiredProduct>,
    conversions: &[ConversionTuple],
    servings: i32,
) {
    let servings = Decimal::from(servings);
    for conv in conversions {
        required
            .entry(conv.product_id)
            .and_modify(|r| r.required += conv.quantity_per_serving * servings)
            .or_insert_with(|| RequiredProduct {
                product_id: conv.product_id,
                product_name: conv.product_name.clone(),
                required: conv.quantity_per_serving * servings,
            });
    }
}

fn build_report(
    required: BTreeMap<i64, RequiredProduct>,
    stock: &[(i64, Decimal)],
) -> AvailabilityReport {
    let available: HashMap<i64, Decimal> = stock.iter().copied().collect();

    let mut insufficient = Vec::new();
    for req in required.values() {
        let available_qty = available
            .get(&req.product_id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        if req.required > available_qty {
            insufficient.push(Shortage {
                product_id: req.product_id,
                product_name: req.product_name.clone(),
                required: req.required,
                available: available_qty,
                shortage: req.required - available_qty,
            });
        }
    }

    AvailabilityReport {
        is_valid: insufficient.is_empty(),
        required: required.into_values().collect(),
        insufficient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn conv(product_id: i64, name: &str, per_serving: Decimal) -> ConversionTuple {
        ConversionTuple {
            product_id,
            product_name: name.to_string(),
            quantity_per_serving: per_serving,
        }
    }

    #[test]
    fn linhas_distintas_somam_no_mesmo_produto() {
        let mut required = BTreeMap::new();

        // Pizza (2 porções) e calzone (1 porção) consomem a mesma farinha.
        accumulate(&mut required, &[conv(1, "Farinha", dec!(0.5))], 2);
        accumulate(
            &mut required,
            &[conv(1, "Farinha", dec!(0.3)), conv(2, "Molho", dec!(0.1))],
            1,
        );

        assert_eq!(required[&1].required, dec!(1.3));
        assert_eq!(required[&2].required, dec!(0.1));
    }

    #[test]
    fn item_sem_vinculo_nao_contribui() {
        let mut required = BTreeMap::new();
        accumulate(&mut required, &[], 5);
        assert!(required.is_empty());

        let report = build_report(required, &[]);
        assert!(report.is_valid);
        assert!(report.required.is_empty());
        assert!(report.insufficient.is_empty());
    }

    #[test]
    fn falta_e_reportada_com_o_deficit_exato() {
        // Produto com 5 em estoque e necessidade de 6: falta exatamente 1.
        let mut required = BTreeMap::new();
        accumulate(&mut required, &[conv(7, "Queijo", dec!(3))], 2);

        let report = build_report(required, &[(7, dec!(5))]);
        assert!(!report.is_valid);
        assert_eq!(report.insufficient.len(), 1);

        let falta = &report.insufficient[0];
        assert_eq!(falta.product_id, 7);
        assert_eq!(falta.required, dec!(6));
        assert_eq!(falta.available, dec!(5));
        assert_eq!(falta.shortage, dec!(1));
    }

    #[test]
    fn todas_as_faltas_sao_enumeradas() {
        let mut required = BTreeMap::new();
        accumulate(
            &mut required,
            &[
                conv(1, "Farinha", dec!(2)),
                conv(2, "Molho", dec!(1)),
                conv(3, "Queijo", dec!(1)),
            ],
            3,
        );

        let report = build_report(required, &[(1, dec!(1)), (2, dec!(10)), (3, dec!(0.5))]);
        assert!(!report.is_valid);
        // Dois produtos em falta, ambos no relatório.
        assert_eq!(report.insufficient.len(), 2);
        assert_eq!(report.insufficient[0].product_id, 1);
        assert_eq!(report.insufficient[1].product_id, 3);
    }

    #[test]
    fn aritmetica_decimal_sem_ruido_binario() {
        let mut required = BTreeMap::new();
        accumulate(&mut required, &[conv(1, "Farinha", dec!(0.1))], 3);
        assert_eq!(required[&1].required, dec!(0.3));

        let report = build_report(required, &[(1, dec!(0.25))]);
        assert_eq!(report.insufficient[0].shortage, dec!(0.05));
    }

    #[test]
    fn produto_fora_do_snapshot_conta_como_zero() {
        let mut required = BTreeMap::new();
        accumulate(&mut required, &[conv(9, "Manjericão", dec!(1))], 1);

        let report = build_report(required, &[]);
        assert_eq!(report.insufficient[0].available, Decimal::ZERO);
        assert_eq!(report.insufficient[0].shortage, dec!(1));
    }
}
