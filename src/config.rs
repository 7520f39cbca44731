// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{InventoryRepository, MenuRepository, OperationsRepository, TablesRepository},
    services::{
        availability_service::AvailabilityService,
        fulfillment_service::FulfillmentService,
        inventory_service::InventoryService,
        menu_service::MenuService,
        operation_service::OperationService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub inventory_service: InventoryService,
    pub availability_service: AvailabilityService,
    pub fulfillment_service: FulfillmentService,
    pub operation_service: OperationService,
    pub menu_service: MenuService,
    pub tables_repo: TablesRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let menu_repo = MenuRepository::new(db_pool.clone());
        let operations_repo = OperationsRepository::new(db_pool.clone());
        let tables_repo = TablesRepository::new(db_pool.clone());

        let inventory_service = InventoryService::new(inventory_repo.clone());
        let availability_service = AvailabilityService::new(inventory_repo);
        let fulfillment_service = FulfillmentService::new(
            operations_repo.clone(),
            inventory_service.clone(),
            availability_service.clone(),
        );
        let operation_service = OperationService::new(
            operations_repo,
            fulfillment_service.clone(),
            availability_service.clone(),
        );
        let menu_service = MenuService::new(menu_repo);

        Ok(Self {
            db_pool,
            inventory_service,
            availability_service,
            fulfillment_service,
            operation_service,
            menu_service,
            tables_repo,
        })
    }
}
