//src/main.rs

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use restaurante_backend::{config::AppState, docs::ApiDoc, handlers};

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let inventory_routes = Router::new()
        .route("/products"
               ,post(handlers::inventory::create_product)
               .get(handlers::inventory::get_all_products)
        )
        .route("/products/low-stock"
               ,get(handlers::inventory::get_low_stock_products)
        )
        .route("/products/{product_id}"
               ,get(handlers::inventory::get_product)
               .put(handlers::inventory::update_product)
               .delete(handlers::inventory::delete_product)
        )
        .route("/restock"
               ,post(handlers::inventory::restock)
        )
        .route("/adjust"
               ,post(handlers::inventory::adjust)
        )
        .route("/waste"
               ,post(handlers::inventory::record_waste)
        )
        .route("/transactions"
               ,get(handlers::inventory::list_transactions)
        );

    let menu_routes = Router::new()
        .route("/recipes"
               ,post(handlers::menu::create_recipe)
               .get(handlers::menu::get_all_recipes)
        )
        .route("/recipes/{recipe_id}/ingredients"
               ,post(handlers::menu::add_ingredient)
               .get(handlers::menu::list_ingredients)
        )
        .route("/items"
               ,post(handlers::menu::create_menu_item)
               .get(handlers::menu::get_all_menu_items)
        )
        .route("/items/{menu_item_id}"
               ,get(handlers::menu::get_menu_item)
               .put(handlers::menu::update_menu_item)
               .delete(handlers::menu::delete_menu_item)
        )
        .route("/ingredients/{ingredient_id}/products"
               ,post(handlers::menu::link_product)
               .get(handlers::menu::list_ingredient_links)
        )
        .route("/links/{link_id}"
               ,delete(handlers::menu::delete_link)
        );

    let order_routes = Router::new()
        .route("/"
               ,post(handlers::operations::create_order)
               .get(handlers::operations::list_orders)
        )
        .route("/{order_id}"
               ,get(handlers::operations::get_order)
        )
        .route("/{order_id}/items"
               ,post(handlers::operations::add_order_item)
        )
        .route("/{order_id}/status"
               ,post(handlers::operations::transition_order)
        )
        .route("/{order_id}/availability"
               ,get(handlers::operations::check_availability)
        );

    let table_routes = Router::new()
        .route("/"
               ,post(handlers::tables::create_table)
               .get(handlers::tables::list_tables)
        )
        .route("/{table_id}"
               ,put(handlers::tables::update_table)
               .delete(handlers::tables::delete_table)
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/inventory", inventory_routes)
        .nest("/api/menu", menu_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/tables", table_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
