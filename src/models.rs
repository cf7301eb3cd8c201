pub mod auth;
pub mod dashboard;
pub mod inventory;
pub mod opname;
pub mod product;
pub mod warehouse;
