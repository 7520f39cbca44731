// src/docs.rs

use utoipa::OpenApi;

use crate::common::pagination::Paginated;
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- INVENTORY ---
        handlers::inventory::create_product,
        handlers::inventory::get_all_products,
        handlers::inventory::get_low_stock_products,
        handlers::inventory::get_product,
        handlers::inventory::update_product,
        handlers::inventory::delete_product,
        handlers::inventory::restock,
        handlers::inventory::adjust,
        handlers::inventory::record_waste,
        handlers::inventory::list_transactions,

        // --- MENU ---
        handlers::menu::create_recipe,
        handlers::menu::get_all_recipes,
        handlers::menu::add_ingredient,
        handlers::menu::list_ingredients,
        handlers::menu::create_menu_item,
        handlers::menu::get_all_menu_items,
        handlers::menu::get_menu_item,
        handlers::menu::update_menu_item,
        handlers::menu::delete_menu_item,
        handlers::menu::link_product,
        handlers::menu::list_ingredient_links,
        handlers::menu::delete_link,

        // --- OPERATIONS ---
        handlers::operations::create_order,
        handlers::operations::list_orders,
        handlers::operations::get_order,
        handlers::operations::add_order_item,
        handlers::operations::transition_order,
        handlers::operations::check_availability,

        // --- TABLES ---
        handlers::tables::create_table,
        handlers::tables::list_tables,
        handlers::tables::update_table,
        handlers::tables::delete_table,
    ),
    components(
        schemas(
            // --- Inventory ---
            models::inventory::Product,
            models::inventory::TransactionType,
            models::inventory::ReferenceType,
            models::inventory::InventoryTransaction,
            models::inventory::RecipeIngredientProductLink,
            models::inventory::RequiredProduct,
            models::inventory::Shortage,
            models::inventory::AvailabilityReport,

            // --- Menu ---
            models::menu::Recipe,
            models::menu::RecipeIngredient,
            models::menu::MenuItem,

            // --- Operations ---
            models::operations::OrderStatus,
            models::operations::Order,
            models::operations::OrderItem,
            models::operations::OrderDetail,
            services::fulfillment_service::ReconciliationError,
            services::fulfillment_service::ReconciliationOutcome,

            // --- Tables ---
            models::tables::RestaurantTable,

            // --- Paginação ---
            Paginated<models::inventory::InventoryTransaction>,
            Paginated<models::operations::Order>,

            // --- Payloads ---
            handlers::inventory::CreateProductPayload,
            handlers::inventory::UpdateProductPayload,
            handlers::inventory::RestockPayload,
            handlers::inventory::AdjustPayload,
            handlers::inventory::WastePayload,
            handlers::inventory::StockOperationResponse,
            handlers::menu::CreateRecipePayload,
            handlers::menu::AddIngredientPayload,
            handlers::menu::CreateMenuItemPayload,
            handlers::menu::UpdateMenuItemPayload,
            handlers::menu::LinkProductPayload,
            handlers::operations::CreateOrderPayload,
            handlers::operations::AddOrderItemPayload,
            handlers::operations::TransitionOrderPayload,
            handlers::operations::TransitionOrderResponse,
            handlers::tables::CreateTablePayload,
        )
    ),
    tags(
        (name = "Inventory", description = "Gestão de Estoque, Livro-Razão e Produtos"),
        (name = "Menu", description = "Cardápio, Receitas e Vínculos de Insumos"),
        (name = "Operations", description = "Pedidos e Baixa de Estoque"),
        (name = "Tables", description = "Cadastro de Mesas")
    )
)]
pub struct ApiDoc;
