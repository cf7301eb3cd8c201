// src/handlers/auth.rs

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentSession,
    models::auth::{LoginPayload, RegisterPayload},
    session::FlashKind,
    views::{Chrome, LoginTemplate, RegisterTemplate, render},
};

// Formulários HTML chegam com todos os campos como texto.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn login_page(CurrentSession(session): CurrentSession) -> Result<Response, AppError> {
    if session.tokens.has_token().await {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let page = LoginTemplate {
        chrome: Chrome::new(&session, "login", ""),
        email: String::new(),
    };
    Ok(render(&page)?.into_response())
}

pub async fn login(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let payload = LoginPayload {
        email: form.email.trim().to_string(),
        password: form.password,
    };

    match app_state.auth_service.login(&session, payload.clone()).await {
        Ok(user) => {
            let greeting = format!("Bem-vindo, {}!", user.display_name());
            session.push_flash(FlashKind::Success, greeting);
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(e) => {
            tracing::warn!("Login recusado para {}: {}", payload.email, e);
            session.push_flash(FlashKind::Error, e.user_message());
            // O e-mail volta preenchido; a senha não.
            let page = LoginTemplate {
                chrome: Chrome::new(&session, "login", ""),
                email: payload.email,
            };
            Ok(render(&page)?.into_response())
        }
    }
}

pub async fn register_page(CurrentSession(session): CurrentSession) -> Result<Response, AppError> {
    if session.tokens.has_token().await {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let page = RegisterTemplate {
        chrome: Chrome::new(&session, "register", ""),
        name: String::new(),
        email: String::new(),
    };
    Ok(render(&page)?.into_response())
}

pub async fn register(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let payload = RegisterPayload {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password,
    };

    match app_state.auth_service.register(&session, payload.clone()).await {
        Ok(user) => {
            let greeting = format!("Conta criada. Bem-vindo, {}!", user.display_name());
            session.push_flash(FlashKind::Success, greeting);
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(e) => {
            tracing::warn!("Registro recusado para {}: {}", payload.email, e);
            session.push_flash(FlashKind::Error, e.user_message());
            let page = RegisterTemplate {
                chrome: Chrome::new(&session, "register", ""),
                name: payload.name,
                email: payload.email,
            };
            Ok(render(&page)?.into_response())
        }
    }
}

pub async fn logout(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Redirect {
    app_state.auth_service.logout(&session).await;
    session.push_flash(FlashKind::Success, "Você saiu do painel.");
    Redirect::to("/login")
}
