use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::metrics::RATE_LIMIT_ENTRIES;
use crate::state::AppState;

// Periodic cleanup of expired rate limit entries, on top of the per-request one
pub async fn expiry_sweeper(state: Arc<AppState>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Rate limit sweeper started (interval: {:?})", sweep_interval);

    loop {
        interval.tick().await;

        let removed = state.rate_limiter.sweep();
        let tracked = state.rate_limiter.len();
        RATE_LIMIT_ENTRIES.set(tracked as f64);

        if removed > 0 {
            info!(removed, tracked, "Cleaned up expired rate limit entries");
        } else {
            debug!(tracked, "No expired rate limit entries");
        }
    }
}
