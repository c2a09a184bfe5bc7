//! Fixed-window rate limiting
//!
//! Per-(scope, key) counters in process memory. Advisory only: windows are
//! not shared across processes and reset on restart. The limiter never
//! queues or delays a request, it only accepts or rejects.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after_seconds: u64,
}

#[derive(Debug)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter per (scope, key) — typically scope = endpoint name
/// and key = client IP.
#[derive(Debug, Default)]
pub struct FixedWindowRateLimiter {
    windows: Mutex<HashMap<(String, String), Window>>,
}

impl FixedWindowRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks and records one request for (scope, key).
    ///
    /// On first request or after window expiry a new window starts with
    /// count 1. Within a window requests are allowed while the count stays
    /// at or under `limit`; beyond that the decision carries a retry-after
    /// hint of at least one second. Expired windows are pruned lazily on
    /// each call; there is no background timer.
    pub fn check(&self, scope: &str, key: &str, limit: u32, window: Duration) -> RateLimitDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");

        windows.retain(|_, w| w.reset_at > now);

        let entry = windows
            .entry((scope.to_string(), key.to_string()))
            .or_insert_with(|| Window {
                count: 0,
                reset_at: now + window,
            });

        entry.count += 1;
        if entry.count <= limit {
            RateLimitDecision {
                allowed: true,
                remaining: limit - entry.count,
                retry_after_seconds: 0,
            }
        } else {
            let remaining_window = entry.reset_at.saturating_duration_since(now);
            RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after_seconds: (remaining_window.as_millis() as u64).div_ceil(1000).max(1),
            }
        }
    }

    #[cfg(test)]
    fn tracked_windows(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}
