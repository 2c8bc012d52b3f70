//! Three-state circuit breaker guarding the generation backend.
//!
//! When backend calls fail repeatedly the circuit opens and the gateway
//! serves fallback content without touching the backend. After the reset
//! timeout the next caller moves the circuit to half-open and is let
//! through as a probe.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::telemetry;

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Failures before the circuit opens. Default: 5.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a probe is allowed. Default: 60s.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

/// State of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, calls pass through.
    Closed,
    /// Backend considered down, calls are diverted to fallback.
    Open,
    /// Cooldown elapsed, calls are let through to test recovery.
    HalfOpen,
}

impl CircuitState {
    fn label(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Failure-tracking gate in front of the backend.
///
/// `failure_count` is reset to zero on every transition into `Closed` or
/// `HalfOpen`. A failure while half-open reopens the circuit immediately.
pub struct CircuitBreaker {
    circuit: Mutex<Circuit>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a closed circuit breaker.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            circuit: Mutex::new(Circuit {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
            config,
        }
    }

    /// Whether a backend call may be attempted now.
    ///
    /// An open circuit whose reset timeout has elapsed moves to half-open
    /// here, and the caller that triggered the check is allowed through.
    pub fn should_attempt(&self) -> bool {
        let mut circuit = self.circuit.lock();
        match circuit.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let eligible = circuit
                    .last_failure
                    .map_or(true, |at| at.elapsed() > self.config.reset_timeout);
                if eligible {
                    transition(&mut circuit, CircuitState::HalfOpen);
                    circuit.failure_count = 0;
                    info!("circuit half-open, probing backend");
                }
                eligible
            }
        }
    }

    /// Record a successful backend call.
    pub fn record_success(&self) {
        let mut circuit = self.circuit.lock();
        if circuit.state != CircuitState::Closed {
            transition(&mut circuit, CircuitState::Closed);
            info!("circuit closed after successful recovery");
        }
        circuit.failure_count = 0;
    }

    /// Record a failed backend call.
    pub fn record_failure(&self) {
        let mut circuit = self.circuit.lock();
        circuit.failure_count = circuit.failure_count.saturating_add(1);
        circuit.last_failure = Some(Instant::now());

        match circuit.state {
            CircuitState::Closed if circuit.failure_count >= self.config.failure_threshold => {
                transition(&mut circuit, CircuitState::Open);
                warn!(
                    failures = circuit.failure_count,
                    threshold = self.config.failure_threshold,
                    "circuit opened after repeated failures"
                );
            }
            CircuitState::HalfOpen => {
                transition(&mut circuit, CircuitState::Open);
                warn!("circuit reopened after failed recovery attempt");
            }
            _ => {}
        }
    }

    /// Current state, without triggering the open to half-open check.
    pub fn state(&self) -> CircuitState {
        self.circuit.lock().state
    }

    /// Failures recorded since the last reset.
    pub fn failure_count(&self) -> u32 {
        self.circuit.lock().failure_count
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

fn transition(circuit: &mut Circuit, to: CircuitState) {
    circuit.state = to;
    metrics::counter!(telemetry::CIRCUIT_TRANSITIONS_TOTAL, "to" => to.label()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            reset_timeout: Duration::from_secs(60),
        })
    }

    #[test]
    fn circuit_starts_closed() {
        let cb = CircuitBreaker::default();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.should_attempt());
    }

    #[tokio::test(start_paused = true)]
    async fn circuit_opens_at_threshold() {
        let cb = breaker(2);

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.should_attempt());

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.should_attempt());
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_failures() {
        let cb = breaker(3);

        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        assert_eq!(cb.failure_count(), 0);

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn open_circuit_waits_for_reset_timeout() {
        let cb = breaker(1);
        cb.record_failure();

        tokio::time::advance(Duration::from_secs(60)).await;
        // Exactly at the timeout is not yet eligible
        assert!(!cb.should_attempt());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cb.should_attempt());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert_eq!(cb.failure_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_success_closes() {
        let cb = breaker(1);
        cb.record_failure();
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cb.should_attempt());

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_failure_reopens_immediately() {
        let cb = breaker(5);
        for _ in 0..5 {
            cb.record_failure();
        }
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cb.should_attempt());

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.should_attempt());
    }
}
