//! Best-effort sliding-window rate limiting, keyed by client identity.
//!
//! This is an abuse deterrent, not a correctness gate: a race that lets one
//! extra request through is acceptable. The store sits behind a trait so
//! tests can inject their own and a deployment can swap in a shared
//! external counter.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited,
}

pub trait RateLimitStore: Send + Sync {
    /// Record one request for `key` and say whether it was within the limit.
    fn check_and_record(&self, key: &str) -> Decision;
}

pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimitStore for SlidingWindowLimiter {
    fn check_and_record(&self, key: &str) -> Decision {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap();

        let timestamps = hits.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return Decision::Limited;
        }
        timestamps.push(now);
        Decision::Allowed
    }
}
