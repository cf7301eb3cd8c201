pub mod api;
pub mod cache;
pub mod common;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod views;
