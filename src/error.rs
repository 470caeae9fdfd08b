use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::FieldError;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Too many requests")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Metrics encoding failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Validation failed", "fields": fields })),
            )
                .into_response(),

            AppError::RateLimited { retry_after_secs } => {
                let retry_after = retry_after_secs.unwrap_or(DEFAULT_RETRY_AFTER_SECS);

                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "error": "Too many requests",
                        "retryAfter": retry_after,
                    })),
                )
                    .into_response();

                let value = HeaderValue::from(retry_after);
                response.headers_mut().insert(RETRY_AFTER, value);
                response
            }

            AppError::Metrics(e) => {
                error!("Failed to encode metrics: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
