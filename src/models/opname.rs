// src/models/opname.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use validator::ValidationErrors;

use crate::common::validation::field_error;

// --- Status da contagem de estoque (opname) ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockOpnameStatus {
    Draft,
    InProgress, // Vira "IN_PROGRESS"
    Completed,
    Cancelled,
}

impl StockOpnameStatus {
    pub const ALL: [StockOpnameStatus; 4] = [
        StockOpnameStatus::Draft,
        StockOpnameStatus::InProgress,
        StockOpnameStatus::Completed,
        StockOpnameStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockOpnameStatus::Draft => "DRAFT",
            StockOpnameStatus::InProgress => "IN_PROGRESS",
            StockOpnameStatus::Completed => "COMPLETED",
            StockOpnameStatus::Cancelled => "CANCELLED",
        }
    }

    // DRAFT -> IN_PROGRESS -> COMPLETED; CANCELLED a partir de qualquer estado aberto.
    pub fn can_transition_to(&self, next: StockOpnameStatus) -> bool {
        use StockOpnameStatus::*;
        matches!(
            (*self, next),
            (Draft, InProgress) | (Draft, Completed) | (InProgress, Completed) | (Draft, Cancelled) | (InProgress, Cancelled)
        )
    }

    /// Próximos status possíveis (botões na tela).
    pub fn next_statuses(&self) -> Vec<StockOpnameStatus> {
        StockOpnameStatus::ALL
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }
}

impl fmt::Display for StockOpnameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockOpnameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockOpnameStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Status desconhecido: {}", s))
    }
}

// --- Opname gravado na API ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpnameLine {
    pub product_id: String,
    #[serde(default)]
    pub system_quantity: Decimal,
    pub actual_quantity: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OpnameLine {
    /// Positivo: sobrou produto na contagem. Negativo: faltou.
    pub fn discrepancy(&self) -> Decimal {
        self.actual_quantity - self.system_quantity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockOpname {
    pub id: String,
    pub warehouse_id: String,
    pub status: StockOpnameStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OpnameLine>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpnameList {
    pub data: Vec<StockOpname>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpnameQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StockOpnameStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl OpnameQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.warehouse_id {
            pairs.push(("warehouseId".to_string(), id.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
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

// --- Corpo do POST /inventory/opnames ---
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOpnameLine {
    pub product_id: String,
    pub actual_quantity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewStockOpname {
    pub warehouse_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<NewOpnameLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpnameStatusUpdate {
    pub status: StockOpnameStatus,
}

// --- Rascunho da contagem, guardado na sessão até o envio ---
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub product_id: String,
    pub system_quantity: Decimal,
    pub physical_quantity: Decimal,
    pub notes: Option<String>,
}

impl DraftLine {
    pub fn discrepancy(&self) -> Decimal {
        self.physical_quantity - self.system_quantity
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpnameDraft {
    pub warehouse_id: Option<String>,
    pub lines: Vec<DraftLine>,
}

impl OpnameDraft {
    /// Troca o armazém da contagem. As linhas são de outro armazém, então somem.
    pub fn select_warehouse(&mut self, warehouse_id: &str) {
        if self.warehouse_id.as_deref() != Some(warehouse_id) {
            self.warehouse_id = Some(warehouse_id.to_string());
            self.lines.clear();
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.lines.iter().any(|line| line.product_id == product_id)
    }

    /// Adiciona o produto com a contagem física zerada.
    /// Produto repetido é ignorado e devolve `false`.
    pub fn add_line(&mut self, product_id: &str, system_quantity: Decimal) -> bool {
        if self.contains(product_id) {
            return false;
        }
        self.lines.push(DraftLine {
            product_id: product_id.to_string(),
            system_quantity,
            physical_quantity: Decimal::ZERO,
            notes: None,
        });
        true
    }

    pub fn remove_line(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        before != self.lines.len()
    }

    pub fn set_physical(
        &mut self,
        product_id: &str,
        physical_quantity: Decimal,
        notes: Option<String>,
    ) -> Result<(), ValidationErrors> {
        if physical_quantity.is_sign_negative() && !physical_quantity.is_zero() {
            return Err(field_error(
                "physicalQuantity",
                "range",
                "A quantidade não pode ser negativa.",
            ));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or_else(|| field_error("productId", "missing", "Produto não está na contagem."))?;
        line.physical_quantity = physical_quantity;
        line.notes = notes;
        Ok(())
    }

    /// Monta o corpo do POST. Exige armazém e pelo menos um item.
    pub fn to_payload(&self, notes: Option<String>) -> Result<NewStockOpname, ValidationErrors> {
        let warehouse_id = self
            .warehouse_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| field_error("warehouseId", "required", "O armazém é obrigatório."))?;

        if self.lines.is_empty() {
            return Err(field_error("items", "length", "Adicione pelo menos um item."));
        }

        Ok(NewStockOpname {
            warehouse_id,
            notes,
            items: self
                .lines
                .iter()
                .map(|line| NewOpnameLine {
                    product_id: line.product_id.clone(),
                    actual_quantity: line.physical_quantity,
                    notes: line.notes.clone(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_products_are_not_added_twice() {
        let mut draft = OpnameDraft::default();
        draft.select_warehouse("w1");
        assert!(draft.add_line("p1", Decimal::from(10)));
        assert!(!draft.add_line("p1", Decimal::from(99)));
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].system_quantity, Decimal::from(10));
    }

    #[test]
    fn switching_warehouse_clears_lines() {
        let mut draft = OpnameDraft::default();
        draft.select_warehouse("w1");
        draft.add_line("p1", Decimal::ONE);
        draft.select_warehouse("w1");
        assert_eq!(draft.lines.len(), 1);
        draft.select_warehouse("w2");
        assert!(draft.lines.is_empty());
    }

    #[test]
    fn payload_requires_warehouse_and_items() {
        let mut draft = OpnameDraft::default();
        assert!(draft.to_payload(None).is_err());

        draft.select_warehouse("w1");
        let errors = draft.to_payload(None).unwrap_err();
        assert!(errors.field_errors().contains_key("items"));

        draft.add_line("p1", Decimal::from(10));
        draft.set_physical("p1", Decimal::from(8), Some("rusak".into())).unwrap();
        let payload = draft.to_payload(Some("bulanan".into())).unwrap();
        assert_eq!(payload.items[0].actual_quantity, Decimal::from(8));

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["warehouseId"], "w1");
        assert_eq!(body["items"][0]["productId"], "p1");
        assert!(body["items"][0].get("systemQuantity").is_none());
    }

    #[test]
    fn negative_physical_count_is_rejected() {
        let mut draft = OpnameDraft::default();
        draft.select_warehouse("w1");
        draft.add_line("p1", Decimal::ZERO);
        assert!(draft.set_physical("p1", Decimal::NEGATIVE_ONE, None).is_err());
        assert!(draft.set_physical("p2", Decimal::ONE, None).is_err());
    }

    #[test]
    fn status_transitions() {
        use StockOpnameStatus::*;
        assert!(Draft.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!InProgress.can_transition_to(Draft));
        assert!(Completed.next_statuses().is_empty());
        assert_eq!("in_progress".parse::<StockOpnameStatus>().unwrap(), InProgress);
    }
}
