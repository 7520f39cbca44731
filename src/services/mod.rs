pub mod availability_service;
pub mod fulfillment_service;
pub mod inventory_service;
pub mod menu_service;
pub mod operation_service;
