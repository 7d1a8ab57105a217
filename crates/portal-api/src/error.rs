//! API error types for the portal endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portal_core::PortalError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for client handling.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Portal API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain error from the lifecycle engine or permission checks.
    #[error(transparent)]
    Portal(#[from] PortalError),

    /// Request body failed declarative validation.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Portal(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_code, message, details) = match &self {
            Self::Portal(PortalError::Storage(msg)) => {
                tracing::error!("Storage error: {}", msg);
                ("storage_error", "A storage error occurred".to_string(), None)
            }
            Self::Portal(PortalError::Validation { field, message }) => (
                "validation_error",
                self.to_string(),
                Some(serde_json::json!({ "field": field, "message": message })),
            ),
            Self::Portal(err) => (err.code(), err.to_string(), None),
            Self::Validation(msg) => ("validation_error", msg.clone(), None),
            Self::Unauthorized => (
                "unauthorized",
                "Missing or invalid authentication token".to_string(),
                None,
            ),
            Self::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                ("storage_error", "A storage error occurred".to_string(), None)
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
