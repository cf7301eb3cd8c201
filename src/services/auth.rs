// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, decode};
use validator::Validate;

use crate::{
    api::AuthRepository,
    cache::keys,
    common::error::AppError,
    models::auth::{AuthResponse, Claims, LoginPayload, RegisterPayload, User},
    session::Session,
};

#[derive(Clone)]
pub struct AuthService {
    auth_repo: AuthRepository,
}

impl AuthService {
    pub fn new(auth_repo: AuthRepository) -> Self {
        Self { auth_repo }
    }

    pub async fn login(&self, session: &Session, payload: LoginPayload) -> Result<User, AppError> {
        payload.validate()?;
        let auth = self.auth_repo.login(&payload).await?;
        let user = self.start(session, auth).await?;
        tracing::info!("🔓 Login de {}", user.email);
        Ok(user)
    }

    pub async fn register(&self, session: &Session, payload: RegisterPayload) -> Result<User, AppError> {
        payload.validate()?;
        let auth = self.auth_repo.register(&payload).await?;
        let user = self.start(session, auth).await?;
        tracing::info!("🆕 Usuário registrado: {}", user.email);
        Ok(user)
    }

    pub async fn logout(&self, session: &Session) {
        session.reset().await;
        tracing::info!("🔒 Logout");
    }

    /// O usuário da sessão, ou `None` se não houver login válido.
    /// Só chama `/auth/me` quando existe um token.
    pub async fn current_user(&self, session: &Session) -> Result<Option<User>, AppError> {
        let Some(token) = session.tokens.access_token().await else {
            return Ok(None);
        };

        // Token vencido e nada para renová-lo: nem adianta perguntar à API.
        if token_is_expired(&token, Utc::now().timestamp())
            && session.tokens.refresh_token().await.is_none()
        {
            session.tokens.clear().await;
            session.cache.clear();
            return Ok(None);
        }

        let fetched = session
            .cache
            .fetch(keys::user(), || self.auth_repo.me(&session.tokens))
            .await;

        match fetched {
            Ok(user) => Ok(Some(user)),
            Err(e) if !e.is_session_error() && !matches!(e, AppError::InvalidCredentials) => Err(e),
            Err(e) => {
                tracing::warn!("Não foi possível carregar o usuário: {}", e);
                session.tokens.clear().await;
                session.cache.clear();
                Ok(None)
            }
        }
    }

    // Guarda os tokens e já deixa o usuário no cache.
    // O id da sessão é renovado: o cookie de antes do login não serve mais.
    async fn start(&self, session: &Session, auth: AuthResponse) -> Result<User, AppError> {
        session.reset().await;
        session.tokens.set(auth.token, auth.refresh_token).await;
        session.renew_id();

        let user = match auth.user {
            Some(user) => user,
            None => self.auth_repo.me(&session.tokens).await?,
        };
        session.cache.set(keys::user(), user.clone());
        Ok(user)
    }
}

/// Lê o `exp` do JWT sem verificar a assinatura (a chave é da API).
/// Tokens que não são JWT, ou sem `exp`, nunca são considerados vencidos.
pub fn token_is_expired(token: &str, now: i64) -> bool {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp.is_some_and(|exp| exp <= now),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    fn token_expiring_at(exp: i64) -> String {
        let claims = TestClaims { sub: "u1".into(), exp };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"segredo-da-api")).unwrap()
    }

    #[test]
    fn expired_jwt_is_detected_without_the_key() {
        let now = 1_700_000_000;
        assert!(token_is_expired(&token_expiring_at(now - 60), now));
        assert!(!token_is_expired(&token_expiring_at(now + 3600), now));
    }

    #[test]
    fn opaque_tokens_are_left_to_the_api() {
        assert!(!token_is_expired("not-a-jwt", 0));
    }
}
