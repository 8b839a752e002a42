use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// MessageResponse
///
/// The only body shape clients ever see for errors, and the acknowledgement body
/// for operations that return nothing else (e.g. delete).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// AppError
///
/// Every failure a handler can produce. Each variant maps to a fixed status code
/// and a `{"message": ...}` body. Backend errors keep their source for logging but
/// only the operation-specific message reaches the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: sqlx::Error,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal { message, source } = &self {
            tracing::error!(error = ?source, "{}", message);
        }

        let status = self.status();
        (status, Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Attaches the client-facing message for a failed backend call.
pub trait ResultExt<T> {
    fn context(self, message: &str) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, message: &str) -> Result<T, AppError> {
        self.map_err(|source| AppError::Internal {
            message: message.to_string(),
            source,
        })
    }
}

pub type AppResult<T> = Result<T, AppError>;
