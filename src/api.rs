pub mod client;
pub use client::{ApiClient, ApiRequest, Envelope};
pub mod auth_repo;
pub use auth_repo::AuthRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod warehouse_repo;
pub use warehouse_repo::WarehouseRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
