mod health;
mod membership;
mod metrics;
mod newsletter;

pub use health::health_handler;
pub use membership::membership_handler;
pub use metrics::metrics_handler;
pub use newsletter::newsletter_handler;

use axum::{Json, extract::rejection::JsonRejection};

use crate::error::AppError;
use crate::metrics::VALIDATION_FAILURES;
use crate::models::FieldError;

// Unparseable bodies are reported like any other field error
fn body_or_validation_error<T>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<Json<T>, AppError> {
    payload.map_err(|rejection| {
        VALIDATION_FAILURES.inc();
        AppError::Validation(vec![FieldError::new("body", rejection.body_text())])
    })
}
