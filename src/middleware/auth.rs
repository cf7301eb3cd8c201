// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::User,
    session::{SESSION_COOKIE, Session},
};

// --- 1. Sessão do navegador ---
// Encontra a sessão do cookie e a coloca nos "extensions" da requisição.
// Sem cookie válido a requisição usa uma sessão solta, que só vai para o
// store (e ganha cookie) se sair dela com login ou notificação pendente.
pub async fn session_layer(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let stored = match jar.get(SESSION_COOKIE) {
        Some(cookie) => {
            let id = cookie.value().to_string();
            app_state.sessions.get(&id).await.map(|session| (id, session))
        }
        None => None,
    };

    let (stored_id, session) = match stored {
        Some((id, session)) => (Some(id), session),
        None => (None, Arc::new(Session::new())),
    };

    request.extensions_mut().insert(CurrentSession(session.clone()));
    let response = next.run(request).await;

    let renew = session.take_renewal();
    let id = match stored_id {
        Some(old_id) if renew => app_state.sessions.rotate(&old_id, session).await,
        Some(_) => return response,
        None => {
            if !session.worth_keeping().await {
                return response;
            }
            app_state.sessions.insert(session).await
        }
    };

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(app_state.settings.cookie_secure)
        .path("/")
        .build();
    (jar.add(cookie), response).into_response()
}

// --- 2. Guarda das rotas protegidas ---
// Sem token na sessão, nem chega no handler.
pub async fn session_guard(request: Request, next: Next) -> Response {
    let signed_in = match request.extensions().get::<CurrentSession>() {
        Some(CurrentSession(session)) => session.tokens.has_token().await,
        None => false,
    };

    if !signed_in {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

// --- 3. Extratores ---
#[derive(Clone)]
pub struct CurrentSession(pub Arc<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("session_layer não está instalado").into())
    }
}

// O usuário logado e a sessão dele. Se o login não vale mais, vai para /login.
pub struct AuthenticatedUser {
    pub session: Arc<Session>,
    pub user: User,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, app_state).await?;

        let user = app_state
            .auth_service
            .current_user(&session)
            .await?
            .ok_or(AppError::SessionExpired)?;

        Ok(AuthenticatedUser { session, user })
    }
}
