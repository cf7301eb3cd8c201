// src/services/location_service.rs

use validator::Validate;

use crate::{
    api::WarehouseRepository,
    cache::keys,
    common::{error::AppError, validation::field_error},
    models::warehouse::{Warehouse, WarehousePayload, WarehouseUpdate},
    session::Session,
};

#[derive(Clone)]
pub struct LocationService {
    warehouse_repo: WarehouseRepository,
}

impl LocationService {
    pub fn new(warehouse_repo: WarehouseRepository) -> Self {
        Self { warehouse_repo }
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<Warehouse>, AppError> {
        session
            .cache
            .fetch(keys::warehouses(), || self.warehouse_repo.list(&session.tokens))
            .await
    }

    pub async fn get(&self, session: &Session, id: &str) -> Result<Warehouse, AppError> {
        session
            .cache
            .fetch(keys::warehouse(id), || self.warehouse_repo.find(&session.tokens, id))
            .await
    }

    pub async fn create(&self, session: &Session, payload: WarehousePayload) -> Result<Warehouse, AppError> {
        payload.validate()?;
        let warehouse = self.warehouse_repo.create(&session.tokens, &payload).await?;

        session.cache.invalidate(&keys::warehouses());
        tracing::info!("🏬 Armazém criado: {}", warehouse.name);
        Ok(warehouse)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: &str,
        changes: WarehouseUpdate,
    ) -> Result<Warehouse, AppError> {
        if changes.is_empty() {
            return Err(field_error("name", "empty", "Nada para atualizar.").into());
        }
        changes.validate()?;
        let warehouse = self.warehouse_repo.update(&session.tokens, id, &changes).await?;

        session.cache.invalidate(&keys::warehouses());
        session.cache.invalidate(&keys::warehouse(id));
        tracing::info!("🏬 Armazém atualizado: {}", id);
        Ok(warehouse)
    }

    pub async fn delete(&self, session: &Session, id: &str) -> Result<(), AppError> {
        self.warehouse_repo.delete(&session.tokens, id).await?;

        session.cache.invalidate(&keys::warehouses());
        session.cache.invalidate(&keys::warehouse(id));
        tracing::info!("🗑️ Armazém removido: {}", id);
        Ok(())
    }
}
