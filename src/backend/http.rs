//! HTTP client for Ollama-compatible generation servers.
//!
//! See: <https://github.com/ollama/ollama/blob/main/docs/api.md>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{BackendRequest, GenerationBackend};
use crate::{GatewayError, Result};

/// Default base URL for a local Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Deadline for the health check probe.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest error body excerpt kept in `Backend` errors.
const MAX_ERROR_BODY: usize = 200;

/// Backend speaking the `/api/generate` protocol.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| GatewayError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a backend sharing an existing HTTP client.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(&self, request: &BackendRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateBody {
            model: &request.model,
            system: &request.system,
            prompt: &request.prompt,
            stream: false,
            format: "json",
            options: GenerateBodyOptions {
                temperature: request.options.temperature,
                top_p: request.options.top_p,
                num_predict: request.options.max_tokens,
            },
        };

        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(GatewayError::Backend {
                status: Some(status.as_u16()),
                message: if excerpt.is_empty() {
                    status.to_string()
                } else {
                    excerpt
                },
            });
        }

        // A success body outside the envelope is returned as-is for wrapping
        let text = response.text().await?;
        match serde_json::from_str::<GenerateReply>(&text) {
            Ok(reply) => {
                debug!(model = %request.model, chars = reply.response.len(), "backend replied");
                Ok(reply.response)
            }
            Err(e) => {
                debug!(
                    model = %request.model,
                    error = %e,
                    "backend reply is not a generate envelope"
                );
                Ok(text)
            }
        }
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.http.get(&url).timeout(HEALTH_CHECK_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "backend health check failed");
                false
            }
        }
    }
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    options: GenerateBodyOptions,
}

#[derive(Serialize)]
struct GenerateBodyOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateReply {
    response: String,
}
