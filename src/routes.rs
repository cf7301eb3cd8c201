// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    config::AppState,
    handlers,
    middleware::auth::{session_guard, session_layer},
};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas (login e registro)
    let public_routes = Router::new()
        .route(
            "/login",
            get(handlers::auth::login_page).post(handlers::auth::login),
        )
        .route(
            "/register",
            get(handlers::auth::register_page).post(handlers::auth::register),
        )
        .route("/logout", post(handlers::auth::logout));

    // Rotas do painel (protegidas pelo guard)
    let panel_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::products::product_detail).post(handlers::products::update_product),
        )
        .route("/products/{id}/delete", post(handlers::products::delete_product))
        .route(
            "/warehouse",
            get(handlers::warehouses::list_warehouses).post(handlers::warehouses::create_warehouse),
        )
        .route(
            "/warehouse/{id}",
            get(handlers::warehouses::warehouse_detail).post(handlers::warehouses::update_warehouse),
        )
        .route("/warehouse/{id}/delete", post(handlers::warehouses::delete_warehouse))
        .route("/inventory", get(handlers::inventory::inventory_page))
        .route("/inventory/items", post(handlers::inventory::upsert_stock_item))
        .route(
            "/inventory/items/{id}/quantity",
            post(handlers::inventory::update_stock_quantity),
        )
        .route(
            "/inventory/items/{id}/delete",
            post(handlers::inventory::delete_stock_item),
        )
        .route("/inventory/movements", post(handlers::inventory::create_movement))
        .route("/inventory/transfers", post(handlers::inventory::create_transfer))
        .route("/inventory/opname", post(handlers::inventory::submit_opname))
        .route("/inventory/opname/items", post(handlers::inventory::add_draft_item))
        .route(
            "/inventory/opname/items/{product_id}",
            post(handlers::inventory::set_physical_count),
        )
        .route(
            "/inventory/opname/items/{product_id}/delete",
            post(handlers::inventory::remove_draft_item),
        )
        .route(
            "/inventory/opnames/{id}/status",
            post(handlers::inventory::update_opname_status),
        )
        .layer(axum_middleware::from_fn(session_guard));

    // Combina tudo no router principal
    Router::new()
        .route("/", get(handlers::app::index))
        .merge(public_routes)
        .merge(panel_routes)
        .fallback(handlers::app::not_found)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_layer,
        ))
        // Depois do session_layer: o health check nunca toca em sessão.
        .route("/health", get(handlers::app::health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
