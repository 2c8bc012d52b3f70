//! Loregate error types

use std::time::Duration;

/// Loregate error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    // Configuration errors (never retried, never counted against the circuit)
    #[error("unknown content category: {0}")]
    UnknownCategory(String),

    #[error("invalid parameters for {category}: {message}")]
    InvalidParameters { category: String, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    // Backend errors (counted as circuit failures)
    #[error("backend call exceeded {0:?}")]
    Timeout(Duration),

    #[error("backend error ({}): {message}", status_label(.status))]
    Backend { status: Option<u16>, message: String },

    // Locally recovered errors
    /// Structured response could not be parsed. Recovered by wrapping the
    /// raw text, never surfaced from `generate`.
    #[error("parse error: {0}")]
    Parse(String),

    /// Cache store unavailable. Recovered as a miss or a no-op.
    #[error("cache error: {0}")]
    Cache(String),

    /// Request queue at capacity. Recovered by returning fallback content.
    #[error("request queue full (capacity {capacity})")]
    QueueOverflow { capacity: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether this error should be counted as a backend failure by the
    /// circuit breaker.
    pub fn is_circuit_failure(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Backend { .. })
    }

    /// Whether this error is a configuration problem with the request or the
    /// service rather than an availability problem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownCategory(_)
                | Self::InvalidParameters { .. }
                | Self::Configuration(_)
        )
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Backend {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "transport".to_string(),
    }
}

/// Result type alias for Loregate operations
pub type Result<T> = std::result::Result<T, GatewayError>;
