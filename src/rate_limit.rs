//! Fixed-window admission control keyed by client identifier.
//!
//! Each identifier gets a counter that lives for one window. Once the window
//! has passed, the next request starts a fresh window with a count of one.
//! There is no smoothing between windows.
//!
//! State is process-local: every instance of the service enforces its own limits.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_WINDOW_SECS: u64 = 60;
pub const MAX_WINDOW_SECS: u64 = 86_400;

// Rate limit entry - tracks requests per IP/key
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

impl RateLimitEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { limit: u32, remaining: u32 },
    Rejected { limit: u32, retry_after_secs: u64 },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Admission::Allowed { .. } => None,
            Admission::Rejected {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
        }
    }
}

pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// Windows longer than [`MAX_WINDOW_SECS`] are capped so `now + window`
    /// cannot overflow.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests: max_requests.max(1),
            window: window.min(Duration::from_secs(MAX_WINDOW_SECS)),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, identifier: &str) -> Admission {
        self.check_at(identifier, Instant::now())
    }

    /// Admission check against an explicit clock reading.
    ///
    /// Expired entries are dropped before the lookup. The read-modify-write on
    /// `identifier` happens under the shard's write lock held by `entry`, so
    /// concurrent callers for the same key are serialized.
    pub fn check_at(&self, identifier: &str, now: Instant) -> Admission {
        // must run before `entry`: retain takes every shard lock in turn
        self.sweep_at(now);

        let mut entry = self
            .entries
            .entry(identifier.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                reset_at: now + self.window,
            });

        if entry.count == 0 || entry.is_expired(now) {
            *entry = RateLimitEntry {
                count: 1,
                reset_at: now + self.window,
            };
            return Admission::Allowed {
                limit: self.max_requests,
                remaining: self.max_requests - 1,
            };
        }

        if entry.count < self.max_requests {
            entry.count += 1;
            return Admission::Allowed {
                limit: self.max_requests,
                remaining: self.max_requests - entry.count,
            };
        }

        Admission::Rejected {
            limit: self.max_requests,
            retry_after_secs: retry_after(entry.reset_at, now),
        }
    }

    /// Drops every entry whose window has passed; returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Whole seconds until reset, rounded up, never below one.
fn retry_after(reset_at: Instant, now: Instant) -> u64 {
    let left = reset_at.saturating_duration_since(now);
    let mut secs = left.as_secs();
    if left.subsec_nanos() > 0 {
        secs += 1;
    }
    secs.max(1)
}
