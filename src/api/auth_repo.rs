// src/api/auth_repo.rs

use crate::{
    api::{ApiClient, ApiRequest},
    common::error::AppError,
    models::auth::{AuthResponse, LoginPayload, RegisterPayload, User},
    session::TokenStore,
};

#[derive(Clone)]
pub struct AuthRepository {
    client: ApiClient,
}

impl AuthRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse, AppError> {
        let request = ApiRequest::post("/auth/login").json(payload)?;
        self.client.send_public(request).await
    }

    pub async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse, AppError> {
        let request = ApiRequest::post("/auth/register").json(payload)?;
        self.client.send_public(request).await
    }

    pub async fn me(&self, tokens: &TokenStore) -> Result<User, AppError> {
        self.client.send(tokens, ApiRequest::get("/auth/me")).await
    }
}
