// src/api/warehouse_repo.rs

use crate::{
    api::{ApiClient, ApiRequest},
    common::error::AppError,
    models::warehouse::{Warehouse, WarehousePayload, WarehouseUpdate},
    session::TokenStore,
};

#[derive(Clone)]
pub struct WarehouseRepository {
    client: ApiClient,
}

impl WarehouseRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, tokens: &TokenStore) -> Result<Vec<Warehouse>, AppError> {
        self.client.send(tokens, ApiRequest::get("/warehouses")).await
    }

    pub async fn find(&self, tokens: &TokenStore, id: &str) -> Result<Warehouse, AppError> {
        self.client
            .send(tokens, ApiRequest::get(format!("/warehouses/{}", id)))
            .await
    }

    pub async fn create(&self, tokens: &TokenStore, payload: &WarehousePayload) -> Result<Warehouse, AppError> {
        let request = ApiRequest::post("/warehouses").json(payload)?;
        self.client.send(tokens, request).await
    }

    pub async fn update(
        &self,
        tokens: &TokenStore,
        id: &str,
        changes: &WarehouseUpdate,
    ) -> Result<Warehouse, AppError> {
        let request = ApiRequest::put(format!("/warehouses/{}", id)).json(changes)?;
        self.client.send(tokens, request).await
    }

    pub async fn delete(&self, tokens: &TokenStore, id: &str) -> Result<(), AppError> {
        self.client
            .send_empty(tokens, ApiRequest::delete(format!("/warehouses/{}", id)))
            .await
    }
}
