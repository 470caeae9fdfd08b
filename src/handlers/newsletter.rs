use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use std::time::Instant;
use tracing::debug;

use crate::error::AppError;
use crate::metrics::{REQUEST_LATENCY, VALIDATION_FAILURES};
use crate::models::{NewsletterRequest, PendingResponse};

use super::body_or_validation_error;

// POST /api/newsletter - join the mailing list (validation only for now)
pub async fn newsletter_handler(
    payload: Result<Json<NewsletterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PendingResponse>), AppError> {
    let start_time = Instant::now();
    let result = accept_signup(payload);
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    result
}

fn accept_signup(
    payload: Result<Json<NewsletterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PendingResponse>), AppError> {
    let Json(request) = body_or_validation_error(payload)?;
    request.validate().map_err(|fields| {
        VALIDATION_FAILURES.inc();
        AppError::Validation(fields)
    })?;

    debug!("Newsletter signup validated");

    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Json(PendingResponse {
            message: "Newsletter signup coming in Phase 1",
            status: "not_implemented",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejected_signup_still_records_latency() {
        let before = REQUEST_LATENCY.get_sample_count();

        let result = newsletter_handler(Ok(Json(NewsletterRequest {
            email: String::new(),
        })))
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(REQUEST_LATENCY.get_sample_count() > before);
    }
}
