// src/common/error.rs

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::views::ErrorTemplate;

// Um único tipo de erro para o painel inteiro.
// Os handlers de formulário transformam a maioria deles em notificação (flash);
// o que sobra vira uma página de erro ou um redirect para o login.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail ou senha inválidos.")]
    InvalidCredentials,

    // Token ausente, expirado, ou o refresh falhou: o usuário volta para /login.
    #[error("Sessão expirada. Faça login novamente.")]
    SessionExpired,

    #[error("Não encontrado: {0}")]
    NotFound(String),

    // Contagem concluída, mas parte dos ajustes de estoque não foi gravada.
    #[error("Contagem {opname} concluída, mas os ajustes falharam para: {products}")]
    AdjustmentsFailed { opname: String, products: String },

    // A API respondeu com um status de erro.
    #[error("A API respondeu {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Falha de comunicação com a API: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Erro ao renderizar a página: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Erros que invalidam a sessão: o tratamento é sempre redirecionar para o login.
    pub fn is_session_error(&self) -> bool {
        matches!(self, AppError::SessionExpired)
    }

    /// Mensagem curta para mostrar ao usuário (a notificação "toast").
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(errors) => {
                let mut messages: Vec<String> = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(field, field_errors)| {
                        field_errors.iter().map(move |e| match &e.message {
                            Some(message) => message.to_string(),
                            None => format!("Campo '{}' inválido.", field),
                        })
                    })
                    .collect();
                messages.sort();
                if messages.is_empty() {
                    "Um ou mais campos são inválidos.".to_string()
                } else {
                    messages.join(" ")
                }
            }
            AppError::Api { message, .. } => message.clone(),
            AppError::HttpError(_) => "Não foi possível falar com o servidor.".to_string(),
            AppError::TemplateError(_) | AppError::InternalServerError(_) => {
                "Ocorreu um erro inesperado.".to_string()
            }
            other => other.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::SessionExpired => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::HttpError(_) | AppError::AdjustmentsFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::TemplateError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_session_error() {
            return Redirect::to("/login").into_response();
        }

        let status = self.status();
        if status.is_server_error() {
            // O `tracing` loga a mensagem detalhada que o `thiserror` montou.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let page = ErrorTemplate {
            status: status.as_u16(),
            message: self.user_message(),
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Falha ao renderizar página de erro: {}", e);
                (status, self.user_message()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn validation_messages_are_joined_for_the_flash() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("O nome deve ter no mínimo 2 caracteres.".into());
        errors.add("name", err);

        let message = AppError::ValidationError(errors).user_message();
        assert_eq!(message, "O nome deve ter no mínimo 2 caracteres.");
    }

    #[test]
    fn session_errors_redirect_to_login() {
        let response = AppError::SessionExpired.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[test]
    fn api_status_is_passed_through() {
        let err = AppError::Api { status: 409, message: "SKU já existe".into() };
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "SKU já existe");
    }

    #[test]
    fn failed_adjustments_name_the_products() {
        let err = AppError::AdjustmentsFailed { opname: "op1".into(), products: "p1, p3".into() };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.user_message().contains("p1, p3"));
    }
}
