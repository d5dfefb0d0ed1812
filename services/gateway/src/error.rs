use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use tokex_types::errors::EngineError;

/// Central error type for the gateway
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(inner) => AppError::BadRequest(inner.to_string()),
            EngineError::OrderNotFound { .. } => AppError::NotFound(err.to_string()),
            EngineError::AlreadyTerminal { .. } => AppError::Conflict(err.to_string()),
            // Self-trades surface as rejected orders, not errors; one
            // escaping here is an engine bug
            EngineError::SelfTrade { .. } | EngineError::Invariant { .. } => {
                AppError::Internal(anyhow::anyhow!(err))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT"),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "request aborted");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokex_types::errors::ValidationError;

    #[test]
    fn test_engine_errors_map_to_statuses() {
        let cases = [
            (
                EngineError::Validation(ValidationError::NonPositiveQuantity),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::OrderNotFound {
                    order_id: "x".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::AlreadyTerminal {
                    status: "FILLED".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                EngineError::invariant("crossed book"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
