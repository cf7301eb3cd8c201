// src/config.rs

use anyhow::Context;
use std::{env, fmt::Display, str::FromStr, sync::Arc, time::Duration};

use crate::{
    api::{ApiClient, AuthRepository, InventoryRepository, ProductRepository, WarehouseRepository},
    common::pagination::DEFAULT_PAGE_SIZE,
    services::{
        auth::AuthService, catalog_service::CatalogService, dashboard_service::DashboardService,
        inventory_service::InventoryService, location_service::LocationService,
        opname_service::OpnameService,
    },
    session::SessionStore,
};

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub bind_addr: String,
    pub session_idle: Duration,
    pub page_size: usize,
    pub cookie_secure: bool,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            session_idle: Duration::from_secs(24 * 60 * 60),
            page_size: DEFAULT_PAGE_SIZE,
            cookie_secure: false,
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    /// Lê as variáveis de ambiente (o `.env` já deve ter sido carregado).
    /// Valores ausentes usam o padrão; valores inválidos são erro.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Settings::default();

        let idle_minutes: u64 = env_or("SESSION_IDLE_MINUTES", 24 * 60)?;
        let timeout_secs: u64 = env_or("HTTP_TIMEOUT_SECS", 10)?;
        let page_size: usize = env_or("PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            anyhow::bail!("PAGE_SIZE deve ser maior que zero");
        }

        Ok(Self {
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_idle: Duration::from_secs(idle_minutes * 60),
            page_size,
            cookie_secure: env_or("COOKIE_SECURE", false)?,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Valor inválido para {}: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: SessionStore,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub location_service: LocationService,
    pub inventory_service: InventoryService,
    pub opname_service: OpnameService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        // --- Monta o gráfico de dependências ---
        let client = ApiClient::new(&settings.api_base_url, settings.http_timeout)?;

        let auth_repo = AuthRepository::new(client.clone());
        let product_repo = ProductRepository::new(client.clone());
        let warehouse_repo = WarehouseRepository::new(client.clone());
        tracing::info!("✅ Cliente da API configurado para {}", client.base_url());
        let inventory_repo = InventoryRepository::new(client);

        let auth_service = AuthService::new(auth_repo);
        let catalog_service = CatalogService::new(product_repo);
        let location_service = LocationService::new(warehouse_repo);
        let inventory_service = InventoryService::new(inventory_repo.clone());
        let opname_service = OpnameService::new(
            inventory_repo,
            inventory_service.clone(),
            catalog_service.clone(),
        );
        let dashboard_service = DashboardService::new(
            catalog_service.clone(),
            location_service.clone(),
            inventory_service.clone(),
        );

        Ok(Self {
            sessions: SessionStore::new(settings.session_idle),
            settings: Arc::new(settings),
            auth_service,
            catalog_service,
            location_service,
            inventory_service,
            opname_service,
            dashboard_service,
        })
    }
}
