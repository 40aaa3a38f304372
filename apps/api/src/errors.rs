use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::extraction::ExtractionError;
use crate::persistence::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing resume or job input. Never reaches the network layer.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Network, service, or empty-response failure from the generation service.
    /// The message is already human-readable and safe to show.
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// An operation of the same kind is already in flight for this session.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message suitable for storing in session state and showing inline.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::GenerationFailed(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Extraction(e) => e.to_string(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Storage(_) => "A storage error occurred".to_string(),
            AppError::Export(_) => "Could not create the PDF".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR"),
            AppError::GenerationFailed(msg) => {
                tracing::error!("Generation failed: {msg}");
                (StatusCode::BAD_GATEWAY, "GENERATION_FAILED")
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.user_message()
            }
        }));

        (status, body).into_response()
    }
}
