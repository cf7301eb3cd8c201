pub mod app;
pub mod auth;
pub mod dashboard;
pub mod inventory;
pub mod products;
pub mod warehouses;

use axum::response::Redirect;

use crate::{
    common::error::AppError,
    session::{FlashKind, Session},
};

// Resultado de um formulário: sempre volta para a página de origem com uma
// notificação. Só a sessão expirada escapa (e vira redirect para /login).
pub(crate) fn flash_outcome<T>(
    session: &Session,
    result: Result<T, AppError>,
    success: &str,
    back: &str,
) -> Result<Redirect, AppError> {
    match result {
        Ok(_) => {
            session.push_flash(FlashKind::Success, success);
            Ok(Redirect::to(back))
        }
        Err(e) if e.is_session_error() => Err(e),
        Err(e) => {
            tracing::warn!("Ação recusada: {}", e);
            session.push_flash(FlashKind::Error, e.user_message());
            Ok(Redirect::to(back))
        }
    }
}
