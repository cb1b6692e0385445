//! Per-client request limiting
//!
//! The in-memory limiter is process-local; a multi-instance deployment
//! should put a shared counter store behind the same trait.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Request admission check, keyed by client identity
pub trait RequestLimiter: Send + Sync {
    /// Record an attempt for `key`; false means over the limit
    fn check(&self, key: &str) -> bool;
}

/// Sliding-window in-memory limiter
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for SlidingWindowLimiter {
    /// 20 requests per hour
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), 20)
    }
}

impl RequestLimiter for SlidingWindowLimiter {
    fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let timestamps = entries.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}
