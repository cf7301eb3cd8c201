// src/services/ledger.rs

// O histórico de movimentações é a fonte da verdade; os saldos são derivados
// dele. Aqui a derivação é feita sobre as movimentações carregadas no painel.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::inventory::{StockMovement, StockMovementType};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ledger {
    // (produto, armazém) -> quantidade
    balances: HashMap<(String, String), Decimal>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, movement: &StockMovement) {
        let from = movement.from_warehouse_id.as_deref();
        let to = movement.to_warehouse_id.as_deref();

        match movement.movement_type {
            StockMovementType::In => {
                if let Some(to) = to {
                    self.credit(&movement.product_id, to, movement.quantity);
                }
            }
            StockMovementType::Out => {
                if let Some(from) = from {
                    self.credit(&movement.product_id, from, -movement.quantity);
                }
            }
            // Transferência, ajuste e contagem: tira de `from` (se houver) e põe em `to` (se houver).
            StockMovementType::Transfer | StockMovementType::Adjustment | StockMovementType::Opname => {
                if let Some(from) = from {
                    self.credit(&movement.product_id, from, -movement.quantity);
                }
                if let Some(to) = to {
                    self.credit(&movement.product_id, to, movement.quantity);
                }
            }
        }
    }

    fn credit(&mut self, product_id: &str, warehouse_id: &str, delta: Decimal) {
        *self
            .balances
            .entry((product_id.to_string(), warehouse_id.to_string()))
            .or_insert(Decimal::ZERO) += delta;
    }

    pub fn quantity(&self, product_id: &str, warehouse_id: &str) -> Decimal {
        self.balances
            .get(&(product_id.to_string(), warehouse_id.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Variação líquida de um armazém, somando todos os produtos.
    pub fn warehouse_total(&self, warehouse_id: &str) -> Decimal {
        self.balances
            .iter()
            .filter(|((_, warehouse), _)| warehouse == warehouse_id)
            .map(|(_, quantity)| *quantity)
            .sum()
    }
}

/// Saldo por (produto, armazém) a partir de uma sequência de movimentações.
pub fn on_hand<'a>(movements: impl IntoIterator<Item = &'a StockMovement>) -> Ledger {
    let mut ledger = Ledger::new();
    for movement in movements {
        ledger.apply(movement);
    }
    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn movement(kind: StockMovementType, qty: i64, from: Option<&str>, to: Option<&str>) -> StockMovement {
        StockMovement {
            id: "m".into(),
            product_id: "p1".into(),
            movement_type: kind,
            quantity: Decimal::from(qty),
            from_warehouse_id: from.map(String::from),
            to_warehouse_id: to.map(String::from),
            reference: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn folds_all_movement_kinds() {
        let history = vec![
            movement(StockMovementType::In, 10, None, Some("w1")),
            movement(StockMovementType::Out, 3, Some("w1"), None),
            movement(StockMovementType::Transfer, 4, Some("w1"), Some("w2")),
            movement(StockMovementType::Adjustment, 1, None, Some("w2")),
            movement(StockMovementType::Opname, 2, Some("w1"), None),
        ];

        let ledger = on_hand(&history);
        assert_eq!(ledger.quantity("p1", "w1"), Decimal::from(1));
        assert_eq!(ledger.quantity("p1", "w2"), Decimal::from(5));
        assert_eq!(ledger.quantity("p1", "w3"), Decimal::ZERO);
    }

    #[test]
    fn transfer_conserves_the_total() {
        let ledger = on_hand(&[
            movement(StockMovementType::In, 8, None, Some("w1")),
            movement(StockMovementType::Transfer, 5, Some("w1"), Some("w2")),
        ]);
        assert_eq!(ledger.warehouse_total("w1") + ledger.warehouse_total("w2"), Decimal::from(8));
    }
}
