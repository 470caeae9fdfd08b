use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("ravehouse_requests_total", "Total number of write requests").unwrap();
    pub static ref ADMISSIONS_ALLOWED: Counter = register_counter!(
        "ravehouse_admissions_allowed_total",
        "Write requests admitted by the rate limiter"
    )
    .unwrap();
    pub static ref ADMISSIONS_REJECTED: Counter = register_counter!(
        "ravehouse_admissions_rejected_total",
        "Write requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref VALIDATION_FAILURES: Counter = register_counter!(
        "ravehouse_validation_failures_total",
        "Requests rejected for malformed bodies"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "ravehouse_request_latency_seconds",
        "Write request latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge =
        register_gauge!("ravehouse_rate_limit_entries", "Clients currently tracked by the rate limiter").unwrap();
}
