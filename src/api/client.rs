// src/api/client.rs

use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    common::error::AppError,
    models::auth::{RefreshTokenRequest, RefreshTokenResponse},
    session::TokenStore,
};

// A API embrulha a maioria das respostas em `{ "data": ... }`, mas nem todas.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

// Corpo de erro da API. Os campos variam por endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Uma chamada à API, guardada para poder ser repetida depois do refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn json<B: serde::Serialize>(mut self, body: &B) -> Result<Self, AppError> {
        let value = serde_json::to_value(body)
            .map_err(|e| anyhow::anyhow!("Falha ao serializar o corpo da requisição: {}", e))?;
        self.body = Some(value);
        Ok(self)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chamada autenticada que devolve um corpo JSON.
    pub async fn send<T: DeserializeOwned>(
        &self,
        tokens: &TokenStore,
        request: ApiRequest,
    ) -> Result<T, AppError> {
        let response = self.send_authorized(tokens, &request).await?;
        decode(response).await
    }

    /// Chamada autenticada cujo corpo não interessa (DELETE, por exemplo).
    pub async fn send_empty(&self, tokens: &TokenStore, request: ApiRequest) -> Result<(), AppError> {
        self.send_authorized(tokens, &request).await?;
        Ok(())
    }

    /// Login e registro: sem token, e 401 aqui significa credenciais erradas.
    pub async fn send_public<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, AppError> {
        let response = self.dispatch(&request, None).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::InvalidCredentials);
        }
        decode(check(response).await?).await
    }

    // 1. passo: manda com o token atual.
    // 2. passo: num 401, exatamente um refresh e uma nova tentativa.
    // Se o refresh falhar (ou a nova tentativa também der 401) a sessão acabou.
    async fn send_authorized(
        &self,
        tokens: &TokenStore,
        request: &ApiRequest,
    ) -> Result<Response, AppError> {
        let token = tokens.access_token().await.ok_or(AppError::SessionExpired)?;

        let response = self.dispatch(request, Some(&token)).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check(response).await;
        }

        tracing::warn!("🔑 Token rejeitado em {} {}; tentando refresh", request.method, request.path);
        let new_token = match self.refresh(tokens).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Refresh falhou: {}", e);
                tokens.clear().await;
                return Err(AppError::SessionExpired);
            }
        };

        let retried = self.dispatch(request, Some(&new_token)).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Token novo também foi rejeitado; encerrando a sessão");
            tokens.clear().await;
            return Err(AppError::SessionExpired);
        }
        check(retried).await
    }

    async fn refresh(&self, tokens: &TokenStore) -> Result<String, AppError> {
        let refresh_token = tokens.refresh_token().await.ok_or(AppError::SessionExpired)?;

        let request = ApiRequest::post("/auth/refresh-token").json(&RefreshTokenRequest { refresh_token })?;
        let response = self.dispatch(&request, None).await?;
        if !response.status().is_success() {
            return Err(AppError::SessionExpired);
        }

        let refreshed: RefreshTokenResponse = decode(response).await?;
        tokens
            .store_refreshed(refreshed.access_token.clone(), refreshed.refresh_token)
            .await;
        tracing::info!("🔑 Token renovado");
        Ok(refreshed.access_token)
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, AppError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| {
            tracing::error!("Falha ao enviar {} {}: {}", request.method, url, e);
            AppError::HttpError(e)
        })
    }
}

// Converte respostas de erro da API em `AppError`.
async fn check(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Erro desconhecido")
                .to_string()
        });

    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(message));
    }
    Err(AppError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let envelope: Envelope<T> = response.json().await?;
    Ok(envelope.into_inner())
}
