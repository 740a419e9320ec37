//! Per-client request throttling.

use std::time::Duration;

/// Counts requests per client key against a fixed quota.
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key` and report whether it fits the quota.
    fn check(&self, key: &str) -> RateLimitResult;
}

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Wait until the next request would be admitted; zero when `allowed`.
    pub reset_after: Duration,
}

