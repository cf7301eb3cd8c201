// src/handlers/dashboard.rs

use axum::{extract::State, response::Html};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::{
    common::{
        error::AppError,
        format::{format_quantity, format_rupiah},
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    views::{Chrome, DashboardTemplate, LowStockRow, MovementRow, WarehouseStockRow, render},
};

const RECENT_MOVEMENTS: u32 = 5;

pub async fn dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, user }: AuthenticatedUser,
) -> Result<Html<String>, AppError> {
    let summary = app_state.dashboard_service.overview(&session).await?;
    let movements = app_state
        .dashboard_service
        .recent_movements(&session, RECENT_MOVEMENTS)
        .await?;

    // Nomes para a tabela de movimentações (já estão no cache)
    let products = app_state.catalog_service.list(&session).await?;
    let warehouses = app_state.location_service.list(&session).await?;
    let product_names: HashMap<&str, &str> = products.iter().map(|p| (p.id.as_str(), p.name.as_str())).collect();
    let warehouse_names: HashMap<&str, &str> =
        warehouses.iter().map(|w| (w.id.as_str(), w.name.as_str())).collect();

    let page = DashboardTemplate {
        chrome: Chrome::new(&session, "dashboard", user.display_name()),
        total_asset_value: format_rupiah(summary.total_asset_value),
        warehouse_count: summary.warehouse_count,
        distinct_products: summary.distinct_products,
        total_units: format_quantity(summary.total_units),
        warehouses: summary
            .per_warehouse
            .iter()
            .map(|w| WarehouseStockRow {
                name: w.warehouse_name.clone(),
                units: format_quantity(w.total_units),
                value: format_rupiah(w.total_value),
                share: format_quantity(w.share_percent),
                share_width: w.share_percent.min(Decimal::ONE_HUNDRED).round().to_string(),
            })
            .collect(),
        low_stock: summary
            .low_stock
            .iter()
            .map(|entry| LowStockRow {
                product: entry.product_name.clone(),
                warehouse: entry.warehouse_name.clone(),
                quantity: format_quantity(entry.quantity),
                reorder_level: format_quantity(entry.reorder_level),
            })
            .collect(),
        recent_movements: movements
            .iter()
            .map(|m| {
                MovementRow::new(
                    m,
                    |id| product_names.get(id).map(|n| n.to_string()).unwrap_or_else(|| id.to_string()),
                    |id| warehouse_names.get(id).map(|n| n.to_string()).unwrap_or_else(|| id.to_string()),
                )
            })
            .collect(),
    };
    render(&page)
}
