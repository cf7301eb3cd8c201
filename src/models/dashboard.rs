// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

// 1. Estoque por armazém (barra de participação no valor total)
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStock {
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub total_units: Decimal,
    pub total_value: Decimal,
    /// Participação no valor total, de 0 a 100.
    pub share_percent: Decimal,
}

// 2. Itens no nível de reposição ou abaixo
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LowStockEntry {
    pub product_name: String,
    pub warehouse_name: String,
    pub quantity: Decimal,
    pub reorder_level: Decimal,
}

// 3. Resumo (os cards do topo)
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_asset_value: Decimal,
    pub warehouse_count: usize,
    pub distinct_products: usize,
    pub total_units: Decimal,
    pub per_warehouse: Vec<WarehouseStock>,
    pub low_stock: Vec<LowStockEntry>,
}
