// src/api/product_repo.rs

use crate::{
    api::{ApiClient, ApiRequest},
    common::error::AppError,
    models::product::{Product, ProductPayload, ProductUpdate},
    session::TokenStore,
};

#[derive(Clone)]
pub struct ProductRepository {
    client: ApiClient,
}

impl ProductRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, tokens: &TokenStore) -> Result<Vec<Product>, AppError> {
        self.client.send(tokens, ApiRequest::get("/products")).await
    }

    pub async fn find(&self, tokens: &TokenStore, id: &str) -> Result<Product, AppError> {
        self.client
            .send(tokens, ApiRequest::get(format!("/products/{}", id)))
            .await
    }

    pub async fn create(&self, tokens: &TokenStore, payload: &ProductPayload) -> Result<Product, AppError> {
        let request = ApiRequest::post("/products").json(payload)?;
        self.client.send(tokens, request).await
    }

    pub async fn update(
        &self,
        tokens: &TokenStore,
        id: &str,
        changes: &ProductUpdate,
    ) -> Result<Product, AppError> {
        let request = ApiRequest::put(format!("/products/{}", id)).json(changes)?;
        self.client.send(tokens, request).await
    }

    pub async fn delete(&self, tokens: &TokenStore, id: &str) -> Result<(), AppError> {
        self.client
            .send_empty(tokens, ApiRequest::delete(format!("/products/{}", id)))
            .await
    }
}
