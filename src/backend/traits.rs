//! Backend trait and request types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Fixed sampling options sent with every backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    /// Sampling temperature. Default: 0.8.
    pub temperature: f32,
    /// Nucleus sampling threshold. Default: 0.9.
    pub top_p: f32,
    /// Maximum tokens to generate. Default: 1024.
    pub max_tokens: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.9,
            max_tokens: 1024,
        }
    }
}

/// One outbound generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub options: SamplingOptions,
}

/// External text-generation service.
///
/// Implementations must be cancel-safe: the caller enforces its deadline by
/// dropping the `complete` future, which has to abort the in-flight call.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name for logging/debugging.
    fn name(&self) -> &str;

    /// Generate text for a request.
    ///
    /// Returns `Backend` on a non-success response or transport failure.
    async fn complete(&self, request: &BackendRequest) -> Result<String>;

    /// Whether the backend currently answers at all.
    async fn health_check(&self) -> bool {
        true
    }
}
