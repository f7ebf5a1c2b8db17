use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shareit_core::{CoreError, NotFoundReason};
use shareit_shared::PageError;

/// Body sent for any unknown or unsupported `state` filter. Clients match on
/// this exact text.
pub const UNSUPPORTED_STATUS_MESSAGE: &str = "Unknown state: UNSUPPORTED_STATUS";

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    UnsupportedState(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnsupportedState(state) => {
                tracing::warn!("Unsupported booking state: {}", state);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UNSUPPORTED_STATUS_MESSAGE.to_string(),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInterval { .. }
            | CoreError::NotAvailable(_)
            | CoreError::ValidationError(_) => AppError::ValidationError(err.to_string()),
            CoreError::NotFound { message, reason } => {
                if reason == NotFoundReason::OwnershipDenied {
                    tracing::debug!("Hiding ownership failure as not found: {}", message);
                }
                AppError::NotFoundError(message)
            }
            CoreError::UnsupportedState(state) => AppError::UnsupportedState(state),
            CoreError::Conflict(msg) => AppError::ConflictError(msg),
            CoreError::StoreError(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<PageError> for AppError {
    fn from(err: PageError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
