//! Admission control for backend calls.
//!
//! - [`CircuitBreaker`] stops calling a failing backend for a cooldown period
//! - [`RateLimiter`] admits a bounded number of calls per fixed window
//!
//! Both measure time with [`tokio::time::Instant`], so tests can drive them
//! with a paused clock.

mod circuit_breaker;
mod rate_limiter;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use rate_limiter::RateLimiter;
