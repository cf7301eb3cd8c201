// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::validation::{validate_not_negative, validate_positive};

// --- 1. Tipos de movimentação ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementType {
    In,         // Vira "IN"
    Out,        // Vira "OUT"
    Transfer,   // Vira "TRANSFER"
    Adjustment, // Vira "ADJUSTMENT"
    Opname,     // Vira "OPNAME"
}

impl StockMovementType {
    pub const ALL: [StockMovementType; 5] = [
        StockMovementType::In,
        StockMovementType::Out,
        StockMovementType::Transfer,
        StockMovementType::Adjustment,
        StockMovementType::Opname,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockMovementType::In => "IN",
            StockMovementType::Out => "OUT",
            StockMovementType::Transfer => "TRANSFER",
            StockMovementType::Adjustment => "ADJUSTMENT",
            StockMovementType::Opname => "OPNAME",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockMovementType::In => "Inbound",
            StockMovementType::Out => "Outbound",
            StockMovementType::Transfer => "Transfer",
            StockMovementType::Adjustment => "Adjustment",
            StockMovementType::Opname => "Stock Opname",
        }
    }
}

impl fmt::Display for StockMovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockMovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockMovementType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Tipo de movimentação desconhecido: {}", s))
    }
}

// --- 2. Linha de estoque (saldo materializado por produto/armazém) ---
// Não é a fonte da verdade: é o resultado das movimentações já aplicadas pela API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub product_id: String,
    pub warehouse_id: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub reorder_level: Option<Decimal>,
    #[serde(default)]
    pub product: Option<ProductSummary>,
    #[serde(default)]
    pub warehouse: Option<WarehouseSummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.reorder_level
            .is_some_and(|level| self.quantity <= level)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemPayload {
    #[validate(length(min = 1, message = "O produto é obrigatório."))]
    pub product_id: String,

    #[validate(length(min = 1, message = "O armazém é obrigatório."))]
    pub warehouse_id: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_negative"))]
    pub reorder_level: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuantityUpdate {
    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,
}

// --- 3. Movimentações de estoque (histórico, só cresce) ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    #[serde(rename = "type")]
    pub movement_type: StockMovementType,
    pub quantity: Decimal,
    #[serde(default)]
    pub from_warehouse_id: Option<String>,
    #[serde(default)]
    pub to_warehouse_id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewStockMovement {
    #[validate(length(min = 1, message = "O produto é obrigatório."))]
    pub product_id: String,

    #[serde(rename = "type")]
    pub movement_type: StockMovementType,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_warehouse_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_warehouse_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewStockMovement {
    pub fn transfer(
        product_id: impl Into<String>,
        quantity: Decimal,
        from_warehouse_id: impl Into<String>,
        to_warehouse_id: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            movement_type: StockMovementType::Transfer,
            quantity,
            from_warehouse_id: Some(from_warehouse_id.into()),
            to_warehouse_id: Some(to_warehouse_id.into()),
            reference: None,
            notes: None,
        }
    }

    // Regras de consistência que o `#[validate]` sozinho não expressa:
    // TRANSFER usa os dois lados (diferentes); IN só destino; OUT só origem;
    // ADJUSTMENT e OPNAME exatamente um lado.
    fn validate_sides(&self) -> Result<(), (&'static str, ValidationError)> {
        let from = self.from_warehouse_id.as_deref().filter(|id| !id.is_empty());
        let to = self.to_warehouse_id.as_deref().filter(|id| !id.is_empty());

        let rule = |field: &'static str, code: &'static str, message: &'static str| {
            let mut err = ValidationError::new(code);
            err.message = Some(message.into());
            Err((field, err))
        };

        match self.movement_type {
            StockMovementType::Transfer => match (from, to) {
                (None, _) => rule(
                    "fromWarehouseId",
                    "required",
                    "O armazém de origem é obrigatório.",
                ),
                (_, None) => rule(
                    "toWarehouseId",
                    "required",
                    "O armazém de destino é obrigatório.",
                ),
                (Some(a), Some(b)) if a == b => rule(
                    "toWarehouseId",
                    "SameWarehouse",
                    "Os armazéns de origem e destino devem ser diferentes.",
                ),
                _ => Ok(()),
            },
            StockMovementType::In => match (from, to) {
                (None, Some(_)) => Ok(()),
                (Some(_), _) => rule(
                    "fromWarehouseId",
                    "OneSideOnly",
                    "Uma entrada (IN) usa apenas o armazém de destino.",
                ),
                (None, None) => rule("toWarehouseId", "required", "O armazém é obrigatório."),
            },
            StockMovementType::Out => match (from, to) {
                (Some(_), None) => Ok(()),
                (_, Some(_)) => rule(
                    "toWarehouseId",
                    "OneSideOnly",
                    "Uma saída (OUT) usa apenas o armazém de origem.",
                ),
                (None, None) => rule("fromWarehouseId", "required", "O armazém é obrigatório."),
            },
            StockMovementType::Adjustment | StockMovementType::Opname => match (from, to) {
                (Some(_), None) | (None, Some(_)) => Ok(()),
                (Some(_), Some(_)) => rule(
                    "toWarehouseId",
                    "OneSideOnly",
                    "Um ajuste usa apenas um armazém.",
                ),
                (None, None) => rule("warehouseId", "required", "O armazém é obrigatório."),
            },
        }
    }

    /// Validação completa (campos + lados), no formato de `ValidationErrors`.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Err((field, err)) = self.validate_sides() {
            errors.add(field, err);
        }
        if errors.errors().is_empty() { Ok(()) } else { Err(errors) }
    }
}

// --- 4. Consulta do histórico ---
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub movement_type: Option<StockMovementType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl MovementQuery {
    /// Pares `chave=valor` para a query string da API.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.warehouse_id {
            pairs.push(("warehouseId".to_string(), id.clone()));
        }
        if let Some(t) = self.movement_type {
            pairs.push(("type".to_string(), t.as_str().to_string()));
        }
        if let Some(d) = self.start_date {
            pairs.push(("startDate".to_string(), d.to_string()));
        }
        if let Some(d) = self.end_date {
            pairs.push(("endDate".to_string(), d.to_string()));
        }
        if let Some(p) = self.page {
            pairs.push(("page".to_string(), p.to_string()));
        }
        if let Some(l) = self.limit {
            pairs.push(("limit".to_string(), l.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(kind: StockMovementType, from: Option<&str>, to: Option<&str>) -> NewStockMovement {
        NewStockMovement {
            product_id: "p1".into(),
            movement_type: kind,
            quantity: Decimal::from(3),
            from_warehouse_id: from.map(String::from),
            to_warehouse_id: to.map(String::from),
            reference: None,
            notes: None,
        }
    }

    #[test]
    fn transfer_without_both_warehouses_is_rejected() {
        let only_source = movement(StockMovementType::Transfer, Some("w1"), None);
        let errors = only_source.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("toWarehouseId"));

        let only_destination = movement(StockMovementType::Transfer, None, Some("w2"));
        let errors = only_destination.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("fromWarehouseId"));

        let blank = movement(StockMovementType::Transfer, Some(""), Some("w2"));
        assert!(blank.validate_all().is_err());
    }

    #[test]
    fn transfer_between_the_same_warehouse_is_rejected() {
        let same = NewStockMovement::transfer("p1", Decimal::ONE, "w1", "w1");
        let errors = same.validate_all().unwrap_err();
        let field = &errors.field_errors()["toWarehouseId"];
        assert_eq!(field[0].code, "SameWarehouse");

        let ok = NewStockMovement::transfer("p1", Decimal::ONE, "w1", "w2");
        assert!(ok.validate_all().is_ok());
    }

    #[test]
    fn single_sided_movements_use_one_warehouse() {
        assert!(movement(StockMovementType::In, None, Some("w1")).validate_all().is_ok());
        assert!(movement(StockMovementType::In, Some("w1"), None).validate_all().is_err());
        assert!(movement(StockMovementType::Out, Some("w1"), None).validate_all().is_ok());
        assert!(movement(StockMovementType::Out, Some("w1"), Some("w2")).validate_all().is_err());
        assert!(movement(StockMovementType::Adjustment, Some("w1"), None).validate_all().is_ok());
        assert!(movement(StockMovementType::Adjustment, None, Some("w1")).validate_all().is_ok());
        assert!(movement(StockMovementType::Adjustment, Some("w1"), Some("w2")).validate_all().is_err());
        assert!(movement(StockMovementType::Adjustment, None, None).validate_all().is_err());
    }

    #[test]
    fn quantity_must_be_positive() {
        let mut zero = movement(StockMovementType::In, None, Some("w1"));
        zero.quantity = Decimal::ZERO;
        let errors = zero.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
    }

    #[test]
    fn movement_serializes_with_api_field_names() {
        let body = serde_json::to_value(NewStockMovement::transfer("p1", Decimal::from(2), "w1", "w2")).unwrap();
        assert_eq!(body["type"], "TRANSFER");
        assert_eq!(body["fromWarehouseId"], "w1");
        assert_eq!(body["toWarehouseId"], "w2");
        assert!(body.get("reference").is_none());
    }

    #[test]
    fn movement_type_parses_from_form_values() {
        assert_eq!("transfer".parse::<StockMovementType>().unwrap(), StockMovementType::Transfer);
        assert!("MOVE".parse::<StockMovementType>().is_err());
    }
}
