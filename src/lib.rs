//! Admission-controlled write endpoints for the Ravehouse site.
//!
//! Newsletter signup and membership intake sit behind a per-client
//! fixed-window rate limiter. Both endpoints validate their payload and then
//! answer `501` until the downstream services exist.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod admission;
pub mod client_ip;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod sweeper;

use admission::admission_middleware;
use handlers::{health_handler, membership_handler, metrics_handler, newsletter_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    // only the write endpoints are rate limited
    let api = Router::new()
        .route("/api/newsletter", post(newsletter_handler))
        .route("/api/membership", post(membership_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admission_middleware,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
