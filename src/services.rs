pub mod auth;
pub mod catalog_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod ledger;
pub mod location_service;
pub mod opname_service;
