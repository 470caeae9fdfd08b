//! End-to-end tests for the admission-controlled endpoints.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use ravehouse_api::app;
use ravehouse_api::config::DeploymentMode;
use ravehouse_api::rate_limit::RateLimiter;
use ravehouse_api::state::AppState;

fn test_app(mode: DeploymentMode) -> Router {
    let limiter = RateLimiter::new(5, Duration::from_secs(60));
    app(Arc::new(AppState::new(limiter, mode)))
}

fn post_json(uri: &str, ip: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn newsletter(ip: &str) -> Request<Body> {
    post_json("/api/newsletter", ip, r#"{"email":"you@nightshift.com"}"#)
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn newsletter_validates_then_reports_not_implemented() {
    let router = test_app(DeploymentMode::Generic);

    let response = router.oneshot(newsletter("203.0.113.7")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.headers()["x-ratelimit-limit"], "5");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "4");
    let json = json_body(response).await;
    assert_eq!(json["status"], "not_implemented");
    assert_eq!(json["message"], "Newsletter signup coming in Phase 1");
}

#[tokio::test]
async fn membership_reports_pending() {
    let router = test_app(DeploymentMode::Generic);

    let response = router
        .oneshot(post_json(
            "/api/membership",
            "203.0.113.7",
            r#"{"email":"dj@ravehouse.vegas","tier":"blackout-host","name":"Jordan Vega"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    let json = json_body(response).await;
    assert_eq!(json["status"], "pending");
}

#[tokio::test]
async fn invalid_body_returns_field_errors() {
    let router = test_app(DeploymentMode::Generic);

    let response = router
        .oneshot(post_json(
            "/api/membership",
            "203.0.113.7",
            r#"{"email":"nope","tier":"platinum"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(json["fields"][0]["field"], "email");
    assert_eq!(json["fields"][1]["field"], "tier");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let router = test_app(DeploymentMode::Generic);

    let response = router
        .oneshot(post_json("/api/newsletter", "203.0.113.7", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["fields"][0]["field"], "body");
}

#[tokio::test]
async fn sixth_request_is_rejected_with_retry_hint() {
    let router = test_app(DeploymentMode::Generic);

    for _ in 0..5 {
        let response = router.clone().oneshot(newsletter("203.0.113.7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    let response = router.oneshot(newsletter("203.0.113.7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");

    let retry_header: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_header));

    let json = json_body(response).await;
    assert_eq!(json["error"], "Too many requests");
    assert_eq!(json["retryAfter"], retry_header);
}

#[tokio::test]
async fn rejection_happens_before_body_validation() {
    let router = test_app(DeploymentMode::Generic);

    for _ in 0..5 {
        router
            .clone()
            .oneshot(post_json("/api/newsletter", "203.0.113.7", "{not json"))
            .await
            .unwrap();
    }

    let response = router
        .oneshot(post_json("/api/newsletter", "203.0.113.7", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn endpoints_share_a_client_quota() {
    let router = test_app(DeploymentMode::Generic);
    let membership = r#"{"email":"dj@ravehouse.vegas","tier":"local-pass"}"#;

    for _ in 0..3 {
        router.clone().oneshot(newsletter("203.0.113.7")).await.unwrap();
    }
    for _ in 0..2 {
        router
            .clone()
            .oneshot(post_json("/api/membership", "203.0.113.7", membership))
            .await
            .unwrap();
    }

    let response = router
        .oneshot(post_json("/api/membership", "203.0.113.7", membership))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn clients_are_limited_independently() {
    let router = test_app(DeploymentMode::Generic);

    for _ in 0..6 {
        router.clone().oneshot(newsletter("203.0.113.7")).await.unwrap();
    }

    let blocked = router.clone().oneshot(newsletter("203.0.113.7:40000")).await.unwrap();
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = router.oneshot(newsletter("198.51.100.2")).await.unwrap();
    assert_eq!(other.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn unidentifiable_clients_share_fallback_bucket() {
    let router = test_app(DeploymentMode::Generic);

    for _ in 0..5 {
        router.clone().oneshot(newsletter("not-an-ip")).await.unwrap();
    }

    let response = router.oneshot(newsletter("also-garbage")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn trusted_edge_buckets_by_edge_header() {
    let router = test_app(DeploymentMode::TrustedEdge);

    for i in 0..6 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/newsletter")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-vercel-forwarded-for", "198.51.100.9")
            // spoofed value differs every time and must be ignored
            .header("x-forwarded-for", format!("203.0.113.{i}"))
            .body(Body::from(r#"{"email":"you@nightshift.com"}"#))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let expected = if i < 5 {
            StatusCode::NOT_IMPLEMENTED
        } else {
            StatusCode::TOO_MANY_REQUESTS
        };
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test(start_paused = true)]
async fn window_expiry_restores_quota() {
    let router = test_app(DeploymentMode::Generic);

    for _ in 0..5 {
        router.clone().oneshot(newsletter("203.0.113.7")).await.unwrap();
    }
    let blocked = router.clone().oneshot(newsletter("203.0.113.7")).await.unwrap();
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::advance(Duration::from_secs(61)).await;

    for _ in 0..5 {
        let response = router.clone().oneshot(newsletter("203.0.113.7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }
    let response = router.oneshot(newsletter("203.0.113.7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn health_is_not_rate_limited() {
    let router = test_app(DeploymentMode::Generic);

    for _ in 0..10 {
        let response = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn metrics_exposes_admission_counters() {
    let router = test_app(DeploymentMode::Generic);
    router.clone().oneshot(newsletter("203.0.113.7")).await.unwrap();

    let response = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("ravehouse_admissions_allowed_total"));
}
