//! Testes de integração do motor de reconciliação de estoque.
//!
//! Exigem um Postgres acessível via DATABASE_URL (as migrações rodam no
//! setup), por isso ficam atrás de #[ignore]. Rode com:
//!
//!     cargo test -- --ignored

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use restaurante_backend::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    db::TransactionFilter,
    models::{
        inventory::{ReferenceType, TransactionType},
        operations::OrderStatus,
    },
};

static SEQ: AtomicU32 = AtomicU32::new(0);

// Nomes são únicos no banco; cada execução de teste gera os seus.
fn unique_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{nanos}-{seq}")
}

async fn setup() -> AppState {
    let state = AppState::new()
        .await
        .expect("DATABASE_URL deve apontar para um Postgres de teste");
    sqlx::migrate!()
        .run(&state.db_pool)
        .await
        .expect("Falha ao rodar as migrações");
    state
}

struct Scenario {
    product_id: i64,
    order_id: i64,
}

/// Produto -> receita com um insumo -> vínculo -> item de cardápio ->
/// pedido com `servings` porções.
async fn build_pizza_scenario(
    state: &AppState,
    stock: Decimal,
    per_serving: Decimal,
    servings: i32,
) -> Scenario {
    let product = state
        .inventory_service
        .create_product(
            &state.db_pool,
            &unique_name("Farinha"),
            "kg",
            stock,
            dec!(10),
            None,
            None,
        )
        .await
        .unwrap();

    let recipe = state
        .menu_service
        .create_recipe(&state.db_pool, &unique_name("Pizza"))
        .await
        .unwrap();
    let ingredient = state
        .menu_service
        .add_ingredient(&state.db_pool, recipe.id, "Massa")
        .await
        .unwrap();
    state
        .menu_service
        .create_link(&state.db_pool, ingredient.id, product.id, per_serving)
        .await
        .unwrap();

    let menu_item = state
        .menu_service
        .create_menu_item(&state.db_pool, &unique_name("Pizza"), dec!(45), Some(recipe.id))
        .await
        .unwrap();

    let order = state
        .operation_service
        .create_order(&state.db_pool, None, None)
        .await
        .unwrap();
    state
        .operation_service
        .add_item(&state.db_pool, order.id, menu_item.id, servings, None)
        .await
        .unwrap();

    Scenario {
        product_id: product.id,
        order_id: order.id,
    }
}

async fn count_sales(state: &AppState, product_id: i64) -> i64 {
    let filter = TransactionFilter {
        product_id: Some(product_id),
        transaction_type: Some(TransactionType::Sale),
        ..Default::default()
    };
    state
        .inventory_service
        .list_transactions(&filter, &Pagination::default())
        .await
        .unwrap()
        .total
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn pedido_servido_deduz_o_estoque_exatamente_uma_vez() {
    let state = setup().await;
    // Farinha: 100 kg; pizza consome 0.5 kg/porção; pedido com 2 porções.
    let sc = build_pizza_scenario(&state, dec!(100), dec!(0.5), 2).await;

    // PENDING -> PREPARING não toca no estoque.
    let (_, inventory) = state
        .operation_service
        .transition_order(&state.db_pool, sc.order_id, OrderStatus::Preparing, false)
        .await
        .unwrap();
    assert!(inventory.is_none());
    let product = state.inventory_service.get_product(sc.product_id).await.unwrap();
    assert_eq!(product.current_quantity, dec!(100));

    // PREPARING -> SERVED dispara a baixa.
    let (order, inventory) = state
        .operation_service
        .transition_order(&state.db_pool, sc.order_id, OrderStatus::Served, false)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Served);

    let outcome = inventory.expect("a aresta de cumprimento reconcilia");
    assert!(outcome.success);
    assert_eq!(outcome.transactions.len(), 1);
    let sale = &outcome.transactions[0];
    assert_eq!(sale.transaction_type, TransactionType::Sale);
    assert_eq!(sale.quantity_change, dec!(-1.0));
    assert_eq!(sale.reference_type, Some(ReferenceType::Order));
    assert_eq!(sale.reference_id, Some(sc.order_id));

    let product = state.inventory_service.get_product(sc.product_id).await.unwrap();
    assert_eq!(product.current_quantity, dec!(99.0));

    // SERVED -> PAID não reconcilia de novo: nenhuma linha nova no razão.
    let (order, inventory) = state
        .operation_service
        .transition_order(&state.db_pool, sc.order_id, OrderStatus::Paid, false)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert!(inventory.is_none());

    let product = state.inventory_service.get_product(sc.product_id).await.unwrap();
    assert_eq!(product.current_quantity, dec!(99.0));
    assert_eq!(count_sales(&state, sc.product_id).await, 1);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn itens_distintos_somam_em_uma_unica_baixa_por_produto() {
    let state = setup().await;

    let product = state
        .inventory_service
        .create_product(
            &state.db_pool,
            &unique_name("Farinha"),
            "kg",
            dec!(100),
            dec!(10),
            None,
            None,
        )
        .await
        .unwrap();

    // Pizza (0.5 kg/porção) e calzone (0.3 kg/porção) usam a mesma farinha.
    let mut menu_item_ids = Vec::new();
    for (recipe_name, per_serving) in [("Pizza", dec!(0.5)), ("Calzone", dec!(0.3))] {
        let recipe = state
            .menu_service
            .create_recipe(&state.db_pool, &unique_name(recipe_name))
            .await
            .unwrap();
        let ingredient = state
            .menu_service
            .add_ingredient(&state.db_pool, recipe.id, "Massa")
            .await
            .unwrap();
        state
            .menu_service
            .create_link(&state.db_pool, ingredient.id, product.id, per_serving)
            .await
            .unwrap();
        let menu_item = state
            .menu_service
            .create_menu_item(&state.db_pool, &unique_name(recipe_name), dec!(40), Some(recipe.id))
            .await
            .unwrap();
        menu_item_ids.push(menu_item.id);
    }

    let order = state
        .operation_service
        .create_order(&state.db_pool, None, None)
        .await
        .unwrap();
    state
        .operation_service
        .add_item(&state.db_pool, order.id, menu_item_ids[0], 2, None)
        .await
        .unwrap();
    state
        .operation_service
        .add_item(&state.db_pool, order.id, menu_item_ids[1], 1, None)
        .await
        .unwrap();

    let (_, inventory) = state
        .operation_service
        .transition_order(&state.db_pool, order.id, OrderStatus::Served, false)
        .await
        .unwrap();

    // 2 * 0.5 + 1 * 0.3 = 1.3, em UMA única linha do razão.
    let outcome = inventory.unwrap();
    assert_eq!(outcome.transactions.len(), 1);
    assert_eq!(outcome.transactions[0].quantity_change, dec!(-1.3));

    let product = state.inventory_service.get_product(product.id).await.unwrap();
    assert_eq!(product.current_quantity, dec!(98.7));
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn falta_de_estoque_rejeita_a_transicao_sem_mutacao() {
    let state = setup().await;
    // Necessário 6 (3 kg/porção * 2), disponível 5: falta exatamente 1.
    let sc = build_pizza_scenario(&state, dec!(5), dec!(3), 2).await;

    let err = state
        .operation_service
        .transition_order(&state.db_pool, sc.order_id, OrderStatus::Served, false)
        .await
        .unwrap_err();

    let AppError::InsufficientInventory(shortages) = err else {
        panic!("esperava InsufficientInventory, veio outro erro");
    };
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0].product_id, sc.product_id);
    assert_eq!(shortages[0].required, dec!(6));
    assert_eq!(shortages[0].available, dec!(5));
    assert_eq!(shortages[0].shortage, dec!(1));

    // Nada mudou: status, saldo e razão intactos.
    let detail = state.operation_service.get_order_detail(sc.order_id).await.unwrap();
    assert_eq!(detail.header.status, OrderStatus::Pending);

    let product = state.inventory_service.get_product(sc.product_id).await.unwrap();
    assert_eq!(product.current_quantity, dec!(5));
    assert_eq!(count_sales(&state, sc.product_id).await, 0);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn dry_run_de_disponibilidade_nao_tem_efeito_colateral() {
    let state = setup().await;
    let sc = build_pizza_scenario(&state, dec!(5), dec!(3), 2).await;

    // Chamado repetidas vezes, o resolvedor devolve sempre a mesma resposta.
    for _ in 0..3 {
        let report = state
            .operation_service
            .check_availability(&state.db_pool, sc.order_id)
            .await
            .unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.insufficient.len(), 1);
        assert_eq!(report.insufficient[0].shortage, dec!(1));
        assert_eq!(report.required.len(), 1);
        assert_eq!(report.required[0].required, dec!(6));
    }

    let product = state.inventory_service.get_product(sc.product_id).await.unwrap();
    assert_eq!(product.current_quantity, dec!(5));
    assert_eq!(count_sales(&state, sc.product_id).await, 0);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn ajuste_manual_respeita_o_piso_zero() {
    let state = setup().await;
    let product = state
        .inventory_service
        .create_product(
            &state.db_pool,
            &unique_name("Azeite"),
            "L",
            dec!(25.5),
            dec!(5),
            None,
            None,
        )
        .await
        .unwrap();

    // 25.5 + (-10.0) = 15.5, exato em decimal.
    let (transaction, updated) = state
        .inventory_service
        .adjust(&state.db_pool, product.id, dec!(-10.0), Some("Contagem física"))
        .await
        .unwrap();
    assert_eq!(transaction.transaction_type, TransactionType::Adjustment);
    assert_eq!(transaction.quantity_change, dec!(-10.0));
    assert_eq!(updated.current_quantity, dec!(15.5));

    // Ajuste que deixaria o saldo negativo falha SEM gravar nada.
    let err = state
        .inventory_service
        .adjust(&state.db_pool, product.id, dec!(-100), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientInventory(_)));

    let product = state.inventory_service.get_product(product.id).await.unwrap();
    assert_eq!(product.current_quantity, dec!(15.5));
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn reposicao_normaliza_o_sinal_do_valor() {
    let state = setup().await;
    let product = state
        .inventory_service
        .create_product(
            &state.db_pool,
            &unique_name("Tomate"),
            "kg",
            Decimal::ZERO,
            dec!(10),
            None,
            None,
        )
        .await
        .unwrap();

    // restock(-25) grava +25.
    let (transaction, updated) = state
        .inventory_service
        .restock(&state.db_pool, product.id, dec!(-25), None)
        .await
        .unwrap();
    assert_eq!(transaction.transaction_type, TransactionType::Restock);
    assert_eq!(transaction.quantity_change, dec!(25));
    assert_eq!(updated.current_quantity, dec!(25));
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn override_explicito_permite_saldo_negativo() {
    let state = setup().await;
    // Necessário 3, disponível 1.
    let sc = build_pizza_scenario(&state, dec!(1), dec!(1), 3).await;

    let (order, inventory) = state
        .operation_service
        .transition_order(&state.db_pool, sc.order_id, OrderStatus::Served, true)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Served);

    let outcome = inventory.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.transactions.len(), 1);

    // Saldo negativo aqui é o comportamento contratado do override.
    let product = state.inventory_service.get_product(sc.product_id).await.unwrap();
    assert_eq!(product.current_quantity, dec!(-2));
    assert_eq!(count_sales(&state, sc.product_id).await, 1);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn pedido_sem_itens_nao_trava_a_transicao() {
    let state = setup().await;
    let order = state
        .operation_service
        .create_order(&state.db_pool, None, None)
        .await
        .unwrap();

    // A reconciliação falha (order_not_found), mas só falta de estoque
    // bloqueia o status: a transição segue.
    let (order, inventory) = state
        .operation_service
        .transition_order(&state.db_pool, order.id, OrderStatus::Served, false)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Served);

    let outcome = inventory.unwrap();
    assert!(!outcome.success);
    assert!(!outcome.has_shortages());
    assert!(outcome.transactions.is_empty());
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn transicao_invalida_e_rejeitada() {
    let state = setup().await;
    let sc = build_pizza_scenario(&state, dec!(100), dec!(0.5), 1).await;

    state
        .operation_service
        .transition_order(&state.db_pool, sc.order_id, OrderStatus::Paid, false)
        .await
        .unwrap();

    // Pedido pago é terminal.
    let err = state
        .operation_service
        .transition_order(&state.db_pool, sc.order_id, OrderStatus::Pending, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidStatusTransition { .. }));

    // E não aceita mais itens.
    let err = state
        .operation_service
        .add_item(&state.db_pool, sc.order_id, 1, 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::OrderAlreadyClosed(_)));
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn item_sem_vinculo_nao_deduz_nada() {
    let state = setup().await;

    // Item de cardápio sem receita: vender não consome estoque.
    let menu_item = state
        .menu_service
        .create_menu_item(&state.db_pool, &unique_name("Refrigerante"), dec!(8), None)
        .await
        .unwrap();
    let order = state
        .operation_service
        .create_order(&state.db_pool, None, None)
        .await
        .unwrap();
    state
        .operation_service
        .add_item(&state.db_pool, order.id, menu_item.id, 2, None)
        .await
        .unwrap();

    let (order, inventory) = state
        .operation_service
        .transition_order(&state.db_pool, order.id, OrderStatus::Served, false)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Served);

    let outcome = inventory.unwrap();
    assert!(outcome.success);
    assert!(outcome.transactions.is_empty());
}
