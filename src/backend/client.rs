//! Bounded backend invocation and response parsing.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::traits::{BackendRequest, GenerationBackend, SamplingOptions};
use crate::telemetry;
use crate::templates::TemplateRegistry;
use crate::types::{Content, ContentCategory, GenerationRequest};
use crate::{GatewayError, Result};

/// Issues one timeout-bounded backend call per request.
#[derive(Clone)]
pub struct BackendClient {
    backend: Arc<dyn GenerationBackend>,
    templates: Arc<TemplateRegistry>,
    model: String,
    timeout: Duration,
    sampling: SamplingOptions,
}

impl BackendClient {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        templates: Arc<TemplateRegistry>,
        model: impl Into<String>,
        timeout: Duration,
        sampling: SamplingOptions,
    ) -> Self {
        Self {
            backend,
            templates,
            model: model.into(),
            timeout,
            sampling,
        }
    }

    /// Generate content for a request.
    ///
    /// Fails with `UnknownCategory` when no template is registered for the
    /// category, `InvalidParameters` when the parameters do not fit the
    /// template, `Timeout` when the backend exceeds the request timeout
    /// (the in-flight call is dropped), and `Backend` for any other error the
    /// backend returns.
    /// A reply that is not a JSON object is wrapped rather than rejected.
    pub async fn invoke(&self, request: &GenerationRequest) -> Result<Content> {
        let category = request.category();
        let rendered = self.templates.render(request)?;
        let call = BackendRequest {
            model: self.model.clone(),
            system: rendered.system,
            prompt: rendered.prompt,
            options: self.sampling.clone(),
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.backend.complete(&call)).await;
        metrics::histogram!(telemetry::BACKEND_DURATION_SECONDS, "category" => category.as_str())
            .record(started.elapsed().as_secs_f64());

        let text = match outcome {
            Ok(Ok(text)) => {
                record_call(category, "ok");
                text
            }
            Ok(Err(e)) => {
                record_call(category, "error");
                warn!(backend = self.backend.name(), category = %category, error = %e, "backend call failed");
                return Err(into_backend_failure(e));
            }
            Err(_) => {
                record_call(category, "timeout");
                warn!(
                    backend = self.backend.name(),
                    category = %category,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "backend call timed out"
                );
                return Err(GatewayError::Timeout(self.timeout));
            }
        };

        let body = parse_body(category, &text).unwrap_or_else(|e| {
            debug!(category = %category, error = %e, "wrapping unstructured backend reply");
            wrap_raw(category, &text)
        });
        Ok(Content::generated(category, body))
    }

    /// Probe the backend.
    pub async fn health_check(&self) -> bool {
        self.backend.health_check().await
    }
}

fn record_call(category: ContentCategory, status: &'static str) {
    metrics::counter!(telemetry::BACKEND_CALLS_TOTAL,
        "category" => category.as_str(),
        "status" => status,
    )
    .increment(1);
}

/// Errors from the backend seam always count against the circuit.
fn into_backend_failure(err: GatewayError) -> GatewayError {
    match err {
        e @ (GatewayError::Timeout(_) | GatewayError::Backend { .. }) => e,
        other => GatewayError::Backend {
            status: None,
            message: other.to_string(),
        },
    }
}

/// Parse a reply as a JSON object, tolerating a surrounding markdown fence.
fn parse_body(category: ContentCategory, text: &str) -> Result<Value> {
    let trimmed = strip_fence(text.trim());
    let value: Value = serde_json::from_str(trimmed)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(GatewayError::Parse(format!(
            "{category} reply is JSON but not an object"
        )))
    }
}

fn strip_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Generic envelope for replies that are not structured content.
fn wrap_raw(category: ContentCategory, text: &str) -> Value {
    json!({
        "category": category.as_str(),
        "generated": true,
        "content": text,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}
