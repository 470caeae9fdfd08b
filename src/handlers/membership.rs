use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use std::time::Instant;
use tracing::debug;

use crate::error::AppError;
use crate::metrics::{REQUEST_LATENCY, VALIDATION_FAILURES};
use crate::models::{MembershipRequest, PendingResponse};

use super::body_or_validation_error;

// POST /api/membership - membership payment intake (validation only for now)
pub async fn membership_handler(
    payload: Result<Json<MembershipRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PendingResponse>), AppError> {
    let start_time = Instant::now();
    let result = accept_membership(payload);
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    result
}

fn accept_membership(
    payload: Result<Json<MembershipRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PendingResponse>), AppError> {
    let Json(request) = body_or_validation_error(payload)?;
    let tier = request.validate().map_err(|fields| {
        VALIDATION_FAILURES.inc();
        AppError::Validation(fields)
    })?;

    debug!(tier = tier.slug(), "Membership request validated");

    Ok((
        StatusCode::NOT_IMPLEMENTED,
        Json(PendingResponse {
            message: "Membership processing coming in Phase 2",
            status: "pending",
        }),
    ))
}
