use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Clinic closed on this date: {reason}")]
    ClinicClosed { reason: String },

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::ClinicClosed { reason } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Clinic closed on this date", "reason": reason }),
            ),
            // Store and provider failures are logged in full below but never
            // leak detail to the client.
            AppError::Internal(_) | AppError::Database(_) | AppError::ExternalService(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        tracing::error!("Error: {}: {}", status, self);

        (status, Json(body)).into_response()
    }
}
