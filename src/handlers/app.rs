// src/handlers/app.rs

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    common::error::AppError,
    middleware::auth::CurrentSession,
    views::{NotFoundTemplate, render},
};

// `/` só decide para onde mandar o usuário.
pub async fn index(CurrentSession(session): CurrentSession) -> Redirect {
    if session.tokens.has_token().await {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn not_found(uri: Uri) -> Result<Response, AppError> {
    let page = render(&NotFoundTemplate {
        path: uri.path().to_string(),
    })?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}
