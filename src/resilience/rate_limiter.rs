//! Fixed-window rate limiter.
//!
//! The window resets in discrete jumps, so up to twice the limit can be
//! admitted across a window boundary. That burst is accepted behaviour.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct RateWindow {
    start: Instant,
    count: u32,
}

/// Admits at most `limit` calls per `window`.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    current: Mutex<RateWindow>,
}

impl RateLimiter {
    /// Create a limiter whose first window starts now.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            current: Mutex::new(RateWindow {
                start: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Try to admit one call.
    ///
    /// Returns `false` when the current window is exhausted. The count never
    /// exceeds the limit within a window.
    pub fn admit(&self) -> bool {
        let mut current = self.current.lock();
        let now = Instant::now();
        if now.duration_since(current.start) >= self.window {
            current.start = now;
            current.count = 0;
        }
        if current.count >= self.limit {
            return false;
        }
        current.count += 1;
        true
    }

    /// Calls admitted in the current window (0 if the window has elapsed).
    pub fn count(&self) -> u32 {
        let current = self.current.lock();
        if current.start.elapsed() >= self.window {
            0
        } else {
            current.count
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn admits_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.admit());
        assert!(limiter.admit());
        assert!(limiter.admit());
        assert!(!limiter.admit());
        assert_eq!(limiter.count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_duration() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.admit());
        assert!(!limiter.admit());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(!limiter.admit());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(limiter.count(), 0);
        assert!(limiter.admit());
        assert_eq!(limiter.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_across_boundary() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(limiter.admit());
        assert!(limiter.admit());

        tokio::time::advance(Duration::from_secs(1)).await;
        // Four calls within two seconds, split across the boundary
        assert!(limiter.admit());
        assert!(limiter.admit());
        assert!(!limiter.admit());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_limit_denies_everything() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        assert!(!limiter.admit());
        assert_eq!(limiter.count(), 0);
    }
}
