//! Sliding-window rate limiter for login attempts.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Counts attempts per key within a trailing window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    limit: usize,
    inner: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl RateLimiter {
    /// A `limit` of zero disables limiting.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            window,
            limit,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key`, returning `false` if the window is full.
    pub async fn allow(&self, key: &str) -> bool {
        if self.limit == 0 {
            return true;
        }
        let now = Instant::now();
        let mut map = self.inner.lock().await;

        // Drop keys whose whole history has aged out.
        map.retain(|_, attempts| {
            attempts
                .back()
                .is_some_and(|&last| now.duration_since(last) <= self.window)
        });

        let attempts = map.entry(key.to_string()).or_default();
        while let Some(&front) = attempts.front() {
            if now.duration_since(front) > self.window {
                attempts.pop_front();
            } else {
                break;
            }
        }
        if attempts.len() < self.limit {
            attempts.push_back(now);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_limit_within_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.allow("1.2.3.4|a@x.com").await);
        assert!(limiter.allow("1.2.3.4|a@x.com").await);
        assert!(!limiter.allow("1.2.3.4|a@x.com").await);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.allow("a").await);
        assert!(limiter.allow("b").await);
        assert!(!limiter.allow("a").await);
    }

    #[tokio::test]
    async fn window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.allow("k").await);
        assert!(!limiter.allow("k").await);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(limiter.allow("k").await);
    }

    #[tokio::test]
    async fn zero_limit_disables() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        for _ in 0..100 {
            assert!(limiter.allow("k").await);
        }
    }
}
