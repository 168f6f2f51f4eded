//! HTTP error type for colmeia-web.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use colmeia_core::validation::ValidationErrors;
use colmeia_db::error::DatabaseError;
use serde_json::json;
use thiserror::Error;

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    NotFound(String),

    /// No usable identity on the request.
    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Storage failure. The detail is logged, never sent to the client.
    #[error(transparent)]
    Database(DatabaseError),
}

impl WebError {
    pub(crate) fn not_found() -> Self {
        Self::NotFound("Objeto não encontrado.".to_string())
    }

    pub(crate) fn forbidden() -> Self {
        Self::Forbidden("Você não tem permissão para executar esta ação.".to_string())
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::BadRequest(_) => "bad_request",
            Self::Validation(_) => "validation_failed",
            Self::Database(_) => "internal",
        }
    }
}

impl From<DatabaseError> for WebError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NoResult => Self::not_found(),
            DatabaseError::Validation(errors) => Self::Validation(errors),
            DatabaseError::InvalidState(message) => Self::BadRequest(message),
            other => Self::Database(other),
        }
    }
}

impl From<ValidationErrors> for WebError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(fields) => json!({
                "error": {
                    "code": self.code(),
                    "message": "Corrija os erros abaixo.",
                    "fields": fields,
                }
            }),
            Self::Database(error) => {
                tracing::error!(err.msg = %error, err.detail = ?error, "request_failed");
                json!({"error": {"code": self.code(), "message": "Erro interno."}})
            }
            other => json!({"error": {"code": other.code(), "message": other.to_string()}}),
        };
        (status, Json(body)).into_response()
    }
}
