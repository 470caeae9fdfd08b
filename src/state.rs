use crate::config::DeploymentMode;
use crate::rate_limit::RateLimiter;

// app's shared state

pub struct AppState {
    pub rate_limiter: RateLimiter,
    pub deployment: DeploymentMode, // how far client IP headers can be trusted
}

impl AppState {
    pub fn new(rate_limiter: RateLimiter, deployment: DeploymentMode) -> Self {
        Self {
            rate_limiter,
            deployment,
        }
    }
}
