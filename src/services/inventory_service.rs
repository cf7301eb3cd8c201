// src/services/inventory_service.rs

use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    api::InventoryRepository,
    cache::{QueryKey, keys},
    common::error::AppError,
    models::inventory::{
        InventoryItem, InventoryItemPayload, MovementQuery, NewStockMovement, Paginated, QuantityUpdate,
        StockMovement,
    },
    session::Session,
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    // ---
    // Leituras
    // ---

    /// Estoque de um armazém. Sem armazém selecionado, nada é buscado.
    pub async fn warehouse_inventory(
        &self,
        session: &Session,
        warehouse_id: &str,
    ) -> Result<Vec<InventoryItem>, AppError> {
        if warehouse_id.is_empty() {
            return Ok(Vec::new());
        }
        session
            .cache
            .fetch(keys::inventory_by_warehouse(warehouse_id), || {
                self.inventory_repo.by_warehouse(&session.tokens, warehouse_id)
            })
            .await
    }

    /// Estoque de vários armazéns, numa lista só.
    pub async fn warehouses_inventory(
        &self,
        session: &Session,
        warehouse_ids: &[String],
    ) -> Result<Vec<InventoryItem>, AppError> {
        let mut all = Vec::new();
        for id in warehouse_ids {
            all.extend(self.warehouse_inventory(session, id).await?);
        }
        Ok(all)
    }

    pub async fn product_inventory(
        &self,
        session: &Session,
        product_id: &str,
    ) -> Result<Vec<InventoryItem>, AppError> {
        if product_id.is_empty() {
            return Ok(Vec::new());
        }
        session
            .cache
            .fetch(keys::inventory_by_product(product_id), || {
                self.inventory_repo.by_product(&session.tokens, product_id)
            })
            .await
    }

    /// Histórico de movimentações. Filtro e paginação são da API: a página
    /// volta como veio, para que as linhas batam com `pagination.total`.
    pub async fn stock_movements(
        &self,
        session: &Session,
        query: &MovementQuery,
    ) -> Result<Paginated<StockMovement>, AppError> {
        let key = QueryKey::with_params("stock-movements", query);
        session
            .cache
            .fetch(key, || self.inventory_repo.list_movements(&session.tokens, query))
            .await
    }

    // ---
    // Escritas
    // ---

    pub async fn add_or_update_item(
        &self,
        session: &Session,
        payload: InventoryItemPayload,
    ) -> Result<InventoryItem, AppError> {
        payload.validate()?;
        let item = self.inventory_repo.upsert_item(&session.tokens, &payload).await?;

        session.cache.invalidate(&keys::inventory());
        tracing::info!(
            "📥 Estoque gravado: produto {} no armazém {}",
            payload.product_id,
            payload.warehouse_id
        );
        Ok(item)
    }

    pub async fn update_quantity(
        &self,
        session: &Session,
        id: &str,
        quantity: Decimal,
    ) -> Result<InventoryItem, AppError> {
        let update = QuantityUpdate { quantity };
        update.validate()?;
        let item = self.inventory_repo.update_quantity(&session.tokens, id, &update).await?;

        session.cache.invalidate(&keys::inventory());
        tracing::info!("📥 Quantidade atualizada: {} -> {}", id, quantity);
        Ok(item)
    }

    pub async fn delete_item(&self, session: &Session, id: &str) -> Result<(), AppError> {
        self.inventory_repo.delete_item(&session.tokens, id).await?;

        session.cache.invalidate(&keys::inventory());
        tracing::info!("🗑️ Linha de estoque removida: {}", id);
        Ok(())
    }

    /// Registra uma movimentação. As regras de armazém de origem/destino são
    /// verificadas antes de qualquer chamada à API.
    pub async fn create_stock_movement(
        &self,
        session: &Session,
        movement: NewStockMovement,
    ) -> Result<StockMovement, AppError> {
        movement.validate_all()?;
        let created = self.inventory_repo.create_movement(&session.tokens, &movement).await?;

        session.cache.invalidate(&keys::stock_movements());
        session.cache.invalidate(&keys::inventory());
        tracing::info!(
            "🔁 Movimentação {} registrada: {} x {}",
            created.movement_type,
            created.product_id,
            created.quantity
        );
        Ok(created)
    }
}
