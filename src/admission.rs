use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client_ip::{self, UNKNOWN_CLIENT};
use crate::error::AppError;
use crate::metrics::{ADMISSIONS_ALLOWED, ADMISSIONS_REJECTED, RATE_LIMIT_ENTRIES, REQUEST_TOTAL};
use crate::rate_limit::Admission;
use crate::state::AppState;

// Every unidentifiable caller shares this bucket
pub const FALLBACK_KEY: &str = "fallback:unknown";

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Runs ahead of the write handlers: resolves the caller and either passes the
/// request on or answers 429 without touching the body.
pub async fn admission_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    REQUEST_TOTAL.inc();

    let identifier = client_ip::resolve(request.headers(), state.deployment);
    let key = if identifier == UNKNOWN_CLIENT {
        warn!(
            path = %request.uri().path(),
            "Rate limit check with unknown client, using shared fallback bucket"
        );
        FALLBACK_KEY
    } else {
        identifier.as_str()
    };

    let admission = state.rate_limiter.check(key);
    RATE_LIMIT_ENTRIES.set(state.rate_limiter.len() as f64);

    match admission {
        Admission::Allowed { limit, remaining } => {
            ADMISSIONS_ALLOWED.inc();
            debug!(client = %client_ip::fingerprint(key), remaining, "Request admitted");

            let mut response = next.run(request).await;
            add_rate_limit_headers(&mut response, limit, remaining);
            response
        }
        Admission::Rejected {
            limit,
            retry_after_secs,
        } => {
            ADMISSIONS_REJECTED.inc();
            info!(
                client = %client_ip::fingerprint(key),
                retry_after_secs,
                "Rate limit exceeded"
            );

            let mut response = AppError::RateLimited {
                retry_after_secs: Some(retry_after_secs),
            }
            .into_response();
            add_rate_limit_headers(&mut response, limit, 0);
            response
        }
    }
}

fn add_rate_limit_headers(response: &mut Response, limit: u32, remaining: u32) {
    let headers = response.headers_mut();
    headers.insert(LIMIT_HEADER, HeaderValue::from(limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
}
