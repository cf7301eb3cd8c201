// src/handlers/warehouses.rs

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    common::{
        error::AppError,
        format::format_quantity,
        pagination::{Page, filter_by_text},
        validation::{non_empty, parse_optional_integer},
    },
    config::AppState,
    handlers::{flash_outcome, products::ListParams},
    middleware::auth::AuthenticatedUser,
    models::warehouse::{Warehouse, WarehousePayload, WarehouseUpdate},
    views::{Chrome, Pager, StockRow, WarehouseDetailTemplate, WarehouseRow, WarehousesTemplate, render},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WarehouseForm {
    pub name: String,
    pub location: String,
    pub capacity: String,
}

impl WarehouseForm {
    fn into_payload(self) -> Result<WarehousePayload, AppError> {
        Ok(WarehousePayload {
            capacity: parse_optional_integer("capacity", &self.capacity)?,
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
        })
    }

    fn into_update(self) -> Result<WarehouseUpdate, AppError> {
        Ok(WarehouseUpdate {
            capacity: parse_optional_integer("capacity", &self.capacity)?,
            name: non_empty(&self.name),
            location: non_empty(&self.location),
        })
    }
}

pub async fn list_warehouses(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, user }: AuthenticatedUser,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, AppError> {
    let warehouses = app_state.location_service.list(&session).await?;
    let filtered = filter_by_text(warehouses, &params.q, |w| {
        vec![w.name.as_str(), w.location.as_deref().unwrap_or("")]
    });
    let page = Page::paginate(filtered, params.page.unwrap_or(1), app_state.settings.page_size);

    let pager = Pager::from(&page);
    let rows = page
        .items
        .into_iter()
        .map(WarehouseRow::from)
        .collect();

    render(&WarehousesTemplate {
        chrome: Chrome::new(&session, "warehouse", user.display_name()),
        search: params.q,
        rows,
        pager,
    })
}

impl From<Warehouse> for WarehouseRow {
    fn from(w: Warehouse) -> Self {
        Self {
            id: w.id,
            name: w.name,
            location: w.location.unwrap_or_default(),
            capacity: w.capacity.map(|c| c.to_string()).unwrap_or_default(),
        }
    }
}

pub async fn warehouse_detail(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, user }: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let warehouse = app_state.location_service.get(&session, &id).await?;
    let stock = app_state.inventory_service.warehouse_inventory(&session, &id).await?;

    let total_units: Decimal = stock.iter().map(|item| item.quantity).sum();
    let rows = stock
        .iter()
        .map(|item| match &item.product {
            Some(p) => StockRow::new(item, p.name.clone(), p.sku.clone()),
            None => StockRow::new(item, item.product_id.clone(), String::new()),
        })
        .collect();

    render(&WarehouseDetailTemplate {
        chrome: Chrome::new(&session, "warehouse", user.display_name()),
        warehouse: WarehouseRow::from(warehouse),
        total_units: format_quantity(total_units),
        stock: rows,
    })
}

pub async fn create_warehouse(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Form(form): Form<WarehouseForm>,
) -> Result<Redirect, AppError> {
    let result = async {
        let payload = form.into_payload()?;
        app_state.location_service.create(&session, payload).await
    }
    .await;
    flash_outcome(&session, result, "Armazém criado.", "/warehouse")
}

pub async fn update_warehouse(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<WarehouseForm>,
) -> Result<Redirect, AppError> {
    let result = async {
        let changes = form.into_update()?;
        app_state.location_service.update(&session, &id, changes).await
    }
    .await;
    flash_outcome(&session, result, "Armazém atualizado.", "/warehouse")
}

pub async fn delete_warehouse(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let result = app_state.location_service.delete(&session, &id).await;
    flash_outcome(&session, result, "Armazém removido.", "/warehouse")
}
