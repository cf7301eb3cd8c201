// src/services/dashboard_service.rs

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{HashMap, HashSet};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, LowStockEntry, WarehouseStock},
        inventory::{InventoryItem, MovementQuery, StockMovement},
        product::Product,
        warehouse::Warehouse,
    },
    services::{
        catalog_service::CatalogService, inventory_service::InventoryService,
        location_service::LocationService,
    },
    session::Session,
};

#[derive(Clone)]
pub struct DashboardService {
    catalog_service: CatalogService,
    location_service: LocationService,
    inventory_service: InventoryService,
}

impl DashboardService {
    pub fn new(
        catalog_service: CatalogService,
        location_service: LocationService,
        inventory_service: InventoryService,
    ) -> Self {
        Self {
            catalog_service,
            location_service,
            inventory_service,
        }
    }

    pub async fn overview(&self, session: &Session) -> Result<DashboardSummary, AppError> {
        let warehouses = self.location_service.list(session).await?;
        let products = self.catalog_service.list(session).await?;

        let ids: Vec<String> = warehouses.iter().map(|w| w.id.clone()).collect();
        let items = self.inventory_service.warehouses_inventory(session, &ids).await?;

        Ok(summarize(&warehouses, &products, &items))
    }

    pub async fn recent_movements(
        &self,
        session: &Session,
        limit: u32,
    ) -> Result<Vec<StockMovement>, AppError> {
        let query = MovementQuery {
            page: Some(1),
            limit: Some(limit),
            ..Default::default()
        };
        let page = self.inventory_service.stock_movements(session, &query).await?;
        Ok(page.data)
    }
}

// ---
// Agregados do painel
// ---
// Tudo em uma passada sobre as linhas de estoque, com o preço e os nomes
// vindo de mapas (nada de busca linear por item).
pub fn summarize(
    warehouses: &[Warehouse],
    products: &[Product],
    items: &[InventoryItem],
) -> DashboardSummary {
    let catalog: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();
    let warehouse_names: HashMap<&str, &str> = warehouses
        .iter()
        .map(|w| (w.id.as_str(), w.name.as_str()))
        .collect();

    let mut per_warehouse: HashMap<&str, (Decimal, Decimal)> = HashMap::new();
    let mut distinct: HashSet<&str> = HashSet::new();
    let mut total_units = Decimal::ZERO;
    let mut total_asset_value = Decimal::ZERO;
    let mut low_stock = Vec::new();

    for item in items {
        // O catálogo é invalidado a cada edição de produto; o preço embutido
        // na linha de estoque só vale para produtos fora do catálogo.
        let price = catalog
            .get(item.product_id.as_str())
            .map(|p| p.price)
            .or_else(|| item.product.as_ref().and_then(|p| p.price))
            .unwrap_or(Decimal::ZERO);
        let value = item.quantity * price;

        let entry = per_warehouse
            .entry(item.warehouse_id.as_str())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += item.quantity;
        entry.1 += value;

        distinct.insert(item.product_id.as_str());
        total_units += item.quantity;
        total_asset_value += value;

        if item.is_low_stock() {
            let product_name = item
                .product
                .as_ref()
                .map(|p| p.name.clone())
                .or_else(|| catalog.get(item.product_id.as_str()).map(|p| p.name.clone()))
                .unwrap_or_else(|| item.product_id.clone());
            let warehouse_name = warehouse_names
                .get(item.warehouse_id.as_str())
                .map(|name| name.to_string())
                .or_else(|| item.warehouse.as_ref().map(|w| w.name.clone()))
                .unwrap_or_else(|| item.warehouse_id.clone());
            low_stock.push(LowStockEntry {
                product_name,
                warehouse_name,
                quantity: item.quantity,
                reorder_level: item.reorder_level.unwrap_or(Decimal::ZERO),
            });
        }
    }

    let per_warehouse = warehouses
        .iter()
        .map(|w| {
            let (units, value) = per_warehouse
                .get(w.id.as_str())
                .copied()
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            WarehouseStock {
                warehouse_id: w.id.clone(),
                warehouse_name: w.name.clone(),
                total_units: units,
                total_value: value,
                share_percent: share(value, total_asset_value),
            }
        })
        .collect();

    DashboardSummary {
        total_asset_value,
        warehouse_count: warehouses.len(),
        distinct_products: distinct.len(),
        total_units,
        per_warehouse,
        low_stock,
    }
}

fn share(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / total).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}
