// src/services/catalog_service.rs

use validator::Validate;

use crate::{
    api::ProductRepository,
    cache::keys,
    common::{error::AppError, validation::field_error},
    models::product::{Product, ProductPayload, ProductUpdate},
    session::Session,
};

#[derive(Clone)]
pub struct CatalogService {
    product_repo: ProductRepository,
}

impl CatalogService {
    pub fn new(product_repo: ProductRepository) -> Self {
        Self { product_repo }
    }

    pub async fn list(&self, session: &Session) -> Result<Vec<Product>, AppError> {
        session
            .cache
            .fetch(keys::products(), || self.product_repo.list(&session.tokens))
            .await
    }

    pub async fn get(&self, session: &Session, id: &str) -> Result<Product, AppError> {
        session
            .cache
            .fetch(keys::product(id), || self.product_repo.find(&session.tokens, id))
            .await
    }

    pub async fn create(&self, session: &Session, payload: ProductPayload) -> Result<Product, AppError> {
        payload.validate()?;
        let product = self.product_repo.create(&session.tokens, &payload).await?;

        session.cache.invalidate(&keys::products());
        tracing::info!("📦 Produto criado: {} ({})", product.name, product.sku);
        Ok(product)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: &str,
        changes: ProductUpdate,
    ) -> Result<Product, AppError> {
        if changes.is_empty() {
            return Err(field_error("name", "empty", "Nada para atualizar.").into());
        }
        changes.validate()?;
        let product = self.product_repo.update(&session.tokens, id, &changes).await?;

        session.cache.invalidate(&keys::products());
        session.cache.invalidate(&keys::product(id));
        // As linhas de estoque trazem nome e preço do produto embutidos.
        session.cache.invalidate(&keys::inventory());
        tracing::info!("📦 Produto atualizado: {}", id);
        Ok(product)
    }

    pub async fn delete(&self, session: &Session, id: &str) -> Result<(), AppError> {
        self.product_repo.delete(&session.tokens, id).await?;

        session.cache.invalidate(&keys::products());
        session.cache.invalidate(&keys::product(id));
        // As linhas de estoque trazem nome e preço do produto embutidos.
        session.cache.invalidate(&keys::inventory());
        tracing::info!("🗑️ Produto removido: {}", id);
        Ok(())
    }
}
