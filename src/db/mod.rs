pub mod inventory_repo;
pub use inventory_repo::{InventoryRepository, TransactionFilter};
pub mod menu_repo;
pub use menu_repo::MenuRepository;
pub mod operations_repo;
pub use operations_repo::OperationsRepository;
pub mod tables_repo;
pub use tables_repo::TablesRepository;
