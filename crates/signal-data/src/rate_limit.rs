//! Fixed-window request limiter.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Allows `limit` requests per `window`; callers beyond that wait for the
/// window to roll over.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            state: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// `limit` requests per minute.
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Take one request slot, sleeping until the next window if needed.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let elapsed = state.started.elapsed();
                if elapsed >= self.window {
                    state.started = Instant::now();
                    state.count = 0;
                }
                if state.count < self.limit {
                    state.count += 1;
                    return;
                }
                self.window.saturating_sub(elapsed)
            };

            warn!(
                limit = self.limit,
                wait_ms = wait.as_millis() as u64,
                "Request limit reached, waiting for next window"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Requests used in the current window.
    pub async fn used(&self) -> u32 {
        let state = self.state.lock().await;
        if state.started.elapsed() >= self.window {
            0
        } else {
            state.count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_within_limit_does_not_wait() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(limiter.used().await, 5);
    }

    #[tokio::test]
    async fn test_exhausted_window_waits_for_rollover() {
        let limiter = RateLimiter::new(2, Duration::from_millis(80));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(70));
        assert_eq!(limiter.used().await, 1);
    }
}
