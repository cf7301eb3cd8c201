// src/api/inventory_repo.rs

use crate::{
    api::{ApiClient, ApiRequest},
    common::error::AppError,
    models::{
        inventory::{
            InventoryItem, InventoryItemPayload, MovementQuery, NewStockMovement, Paginated,
            QuantityUpdate, StockMovement,
        },
        opname::{NewStockOpname, OpnameList, OpnameQuery, OpnameStatusUpdate, StockOpname},
    },
    session::TokenStore,
};

#[derive(Clone)]
pub struct InventoryRepository {
    client: ApiClient,
}

impl InventoryRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    // ---
    // Saldos (linhas de estoque)
    // ---

    pub async fn by_warehouse(
        &self,
        tokens: &TokenStore,
        warehouse_id: &str,
    ) -> Result<Vec<InventoryItem>, AppError> {
        self.client
            .send(tokens, ApiRequest::get(format!("/inventory/warehouse/{}", warehouse_id)))
            .await
    }

    pub async fn by_product(
        &self,
        tokens: &TokenStore,
        product_id: &str,
    ) -> Result<Vec<InventoryItem>, AppError> {
        self.client
            .send(tokens, ApiRequest::get(format!("/inventory/product/{}", product_id)))
            .await
    }

    pub async fn upsert_item(
        &self,
        tokens: &TokenStore,
        payload: &InventoryItemPayload,
    ) -> Result<InventoryItem, AppError> {
        let request = ApiRequest::post("/inventory").json(payload)?;
        self.client.send(tokens, request).await
    }

    pub async fn update_quantity(
        &self,
        tokens: &TokenStore,
        id: &str,
        update: &QuantityUpdate,
    ) -> Result<InventoryItem, AppError> {
        let request = ApiRequest::patch(format!("/inventory/{}/quantity", id)).json(update)?;
        self.client.send(tokens, request).await
    }

    pub async fn delete_item(&self, tokens: &TokenStore, id: &str) -> Result<(), AppError> {
        self.client
            .send_empty(tokens, ApiRequest::delete(format!("/inventory/{}", id)))
            .await
    }

    // ---
    // Movimentações
    // ---

    pub async fn list_movements(
        &self,
        tokens: &TokenStore,
        query: &MovementQuery,
    ) -> Result<Paginated<StockMovement>, AppError> {
        let request = ApiRequest::get("/inventory/movements").query(query.to_pairs());
        self.client.send(tokens, request).await
    }

    pub async fn create_movement(
        &self,
        tokens: &TokenStore,
        movement: &NewStockMovement,
    ) -> Result<StockMovement, AppError> {
        let request = ApiRequest::post("/inventory/movements").json(movement)?;
        self.client.send(tokens, request).await
    }

    // ---
    // Contagens (opname)
    // ---

    pub async fn list_opnames(
        &self,
        tokens: &TokenStore,
        query: &OpnameQuery,
    ) -> Result<OpnameList, AppError> {
        let request = ApiRequest::get("/inventory/opnames").query(query.to_pairs());
        self.client.send(tokens, request).await
    }

    pub async fn create_opname(
        &self,
        tokens: &TokenStore,
        opname: &NewStockOpname,
    ) -> Result<StockOpname, AppError> {
        let request = ApiRequest::post("/inventory/opnames").json(opname)?;
        self.client.send(tokens, request).await
    }

    pub async fn update_opname_status(
        &self,
        tokens: &TokenStore,
        id: &str,
        update: &OpnameStatusUpdate,
    ) -> Result<StockOpname, AppError> {
        let request = ApiRequest::patch(format!("/inventory/opnames/{}/status", id)).json(update)?;
        self.client.send(tokens, request).await
    }
}
