// src/handlers/products.rs

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
        format::{format_quantity, format_rupiah},
        pagination::{Page, filter_by_text},
        validation::{non_empty, parse_decimal, parse_optional_decimal},
    },
    config::AppState,
    handlers::flash_outcome,
    middleware::auth::AuthenticatedUser,
    models::product::{Product, ProductPayload, ProductUpdate},
    views::{Chrome, Pager, ProductDetailTemplate, ProductRow, ProductStockRow, ProductsTemplate, render},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub q: String,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub sku: String,
    pub price: String,
    pub description: String,
}

impl ProductForm {
    fn into_payload(self) -> Result<ProductPayload, AppError> {
        Ok(ProductPayload {
            price: parse_decimal("price", &self.price)?,
            name: self.name.trim().to_string(),
            sku: self.sku.trim().to_string(),
            description: non_empty(&self.description),
        })
    }

    // Campos vazios ficam de fora da atualização.
    fn into_update(self) -> Result<ProductUpdate, AppError> {
        Ok(ProductUpdate {
            price: parse_optional_decimal("price", &self.price)?,
            name: non_empty(&self.name),
            sku: non_empty(&self.sku),
            description: non_empty(&self.description),
        })
    }
}

pub async fn list_products(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, user }: AuthenticatedUser,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, AppError> {
    let products = app_state.catalog_service.list(&session).await?;
    let filtered = filter_by_text(products, &params.q, |p| vec![p.name.as_str(), p.sku.as_str()]);
    let page = Page::paginate(filtered, params.page.unwrap_or(1), app_state.settings.page_size);

    let pager = Pager::from(&page);
    let rows = page
        .items
        .into_iter()
        .map(ProductRow::from)
        .collect();

    render(&ProductsTemplate {
        chrome: Chrome::new(&session, "products", user.display_name()),
        search: params.q,
        rows,
        pager,
    })
}

impl From<Product> for ProductRow {
    fn from(p: Product) -> Self {
        Self {
            price: format_rupiah(p.price),
            price_raw: p.price.normalize().to_string(),
            description: p.description.unwrap_or_default(),
            id: p.id,
            name: p.name,
            sku: p.sku,
        }
    }
}

// Ficha do produto com o saldo em cada armazém.
pub async fn product_detail(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, user }: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let product = app_state.catalog_service.get(&session, &id).await?;
    let stock = app_state.inventory_service.product_inventory(&session, &id).await?;
    let warehouses = app_state.location_service.list(&session).await?;

    let total_units: Decimal = stock.iter().map(|item| item.quantity).sum();
    let rows = stock
        .iter()
        .map(|item| ProductStockRow {
            warehouse_id: item.warehouse_id.clone(),
            warehouse: item
                .warehouse
                .as_ref()
                .map(|w| w.name.clone())
                .or_else(|| {
                    warehouses
                        .iter()
                        .find(|w| w.id == item.warehouse_id)
                        .map(|w| w.name.clone())
                })
                .unwrap_or_else(|| item.warehouse_id.clone()),
            quantity: format_quantity(item.quantity),
            reorder_level: item.reorder_level.map(format_quantity).unwrap_or_default(),
            low_stock: item.is_low_stock(),
        })
        .collect();

    render(&ProductDetailTemplate {
        chrome: Chrome::new(&session, "products", user.display_name()),
        product: ProductRow::from(product),
        total_units: format_quantity(total_units),
        stock: rows,
    })
}

pub async fn create_product(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    let result = async {
        let payload = form.into_payload()?;
        app_state.catalog_service.create(&session, payload).await
    }
    .await;
    flash_outcome(&session, result, "Produto criado.", "/products")
}

pub async fn update_product(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    let result = async {
        let changes = form.into_update()?;
        app_state.catalog_service.update(&session, &id, changes).await
    }
    .await;
    flash_outcome(&session, result, "Produto atualizado.", "/products")
}

pub async fn delete_product(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let result = app_state.catalog_service.delete(&session, &id).await;
    flash_outcome(&session, result, "Produto removido.", "/products")
}
