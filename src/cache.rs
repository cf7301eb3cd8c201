// src/cache.rs

// Cache de consultas de uma sessão. As chaves são hierárquicas
// (["inventory", "warehouse", "w1"]) e a invalidação é por prefixo:
// invalidar ["inventory"] derruba todas as consultas de estoque.

use dashmap::DashMap;
use serde::Serialize;
use std::{
    any::Any,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::common::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Chave com os parâmetros da consulta serializados no último segmento.
    pub fn with_params<P: Serialize>(root: &str, params: &P) -> Self {
        let encoded = serde_json::to_string(params).unwrap_or_default();
        Self(vec![root.to_string(), encoded])
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

/// As chaves usadas pelo painel, num lugar só.
pub mod keys {
    use super::QueryKey;

    pub fn user() -> QueryKey {
        QueryKey::new(["user"])
    }

    pub fn products() -> QueryKey {
        QueryKey::new(["products"])
    }

    pub fn product(id: &str) -> QueryKey {
        QueryKey::new(["product", id])
    }

    pub fn warehouses() -> QueryKey {
        QueryKey::new(["warehouses"])
    }

    pub fn warehouse(id: &str) -> QueryKey {
        QueryKey::new(["warehouse", id])
    }

    pub fn inventory() -> QueryKey {
        QueryKey::new(["inventory"])
    }

    pub fn inventory_by_warehouse(id: &str) -> QueryKey {
        QueryKey::new(["inventory", "warehouse", id])
    }

    pub fn inventory_by_product(id: &str) -> QueryKey {
        QueryKey::new(["inventory", "product", id])
    }

    pub fn stock_movements() -> QueryKey {
        QueryKey::new(["stock-movements"])
    }

    pub fn stock_opnames() -> QueryKey {
        QueryKey::new(["stock-opnames"])
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct QueryCache {
    entries: DashMap<QueryKey, Entry>,
    // Incrementa a cada invalidação. Uma busca que começou antes de uma
    // invalidação não grava o resultado (que pode estar velho).
    generation: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.entries
            .get(key)
            .and_then(|entry| entry.value().downcast_ref::<T>().cloned())
    }

    pub fn set<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.entries.insert(key, Arc::new(value));
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Devolve o valor em cache ou chama `fetcher` e guarda o resultado.
    /// Erros nunca são guardados.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, AppError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(hit) = self.get::<T>(&key) {
            tracing::debug!(key = ?key, "cache hit");
            return Ok(hit);
        }

        let started_at = self.generation.load(Ordering::Acquire);
        let value = fetcher().await?;
        if self.generation.load(Ordering::Acquire) == started_at {
            self.set(key, value.clone());
        }
        Ok(value)
    }

    /// Remove todas as entradas cuja chave começa com `prefix`.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.entries.len());
        tracing::debug!(prefix = ?prefix, removed, "cache invalidado");
        removed
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
