//! The generation gateway.
//!
//! [`Gateway`] is the single entry point callers use. Every request walks
//! the same pipeline, and the first stage that can answer does:
//!
//! 1. generation disabled (or the gateway shut down): fallback content
//! 2. parameters checked against the category's template
//! 3. circuit open: fallback content
//! 4. rate limit exhausted: park in the overflow queue
//! 5. cache hit: cached content
//! 6. backend call, then advisory validation and a cache write
//! 7. backend failure: fallback content, or the error when
//!    `fallback_on_failure` is off
//!
//! Queued requests re-enter at step 1 once the drain loop has taken a rate
//! limit slot for them, skip step 4, and always resolve to content.

mod builder;

pub use builder::GatewayBuilder;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::Result;
use crate::backend::BackendClient;
use crate::cache::ResponseCache;
use crate::config::GatewayConfig;
use crate::fallback::FallbackProvider;
use crate::queue::{QueueProcessor, RequestQueue};
use crate::resilience::{CircuitBreaker, CircuitState, RateLimiter};
use crate::telemetry;
use crate::templates::TemplateRegistry;
use crate::types::{Content, ContentCategory, GatewayStatus, GenerationRequest, ParamValue};
use crate::validator::Validator;

/// Resilient front door to the generation backend.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

pub(crate) struct GatewayInner {
    config: GatewayConfig,
    templates: Arc<TemplateRegistry>,
    backend: BackendClient,
    cache: ResponseCache,
    circuit: CircuitBreaker,
    limiter: RateLimiter,
    queue: RequestQueue,
    validator: Validator,
    fallbacks: FallbackProvider,
    shut_down: AtomicBool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Admission {
    /// Ask the rate limiter.
    Check,
    /// The drain loop already holds a slot.
    Granted,
}

impl Gateway {
    /// Build a gateway with default collaborators and start its queue
    /// consumer. Must be called from within a tokio runtime.
    pub fn init(config: GatewayConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    /// Generate content for a category.
    ///
    /// Only configuration problems (an unknown category, invalid parameters)
    /// and, with `fallback_on_failure` off, backend failures surface as
    /// errors. Everything else resolves to generated, cached or fallback
    /// content.
    pub async fn generate<I, K, V>(
        &self,
        category: ContentCategory,
        parameters: I,
    ) -> Result<Content>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let request = GenerationRequest::with_parameters(
            category,
            parameters.into_iter().map(|(k, v)| (k.into(), v.into())),
        );
        self.generate_request(request).await
    }

    /// Generate content for a prepared request.
    pub async fn generate_request(&self, request: GenerationRequest) -> Result<Content> {
        self.inner.run(&request, Admission::Check).await
    }

    /// Generate content for a category given by name.
    ///
    /// Fails with `UnknownCategory` if the name is not a supported category.
    pub async fn generate_named(
        &self,
        category: &str,
        parameters: impl IntoIterator<Item = (String, ParamValue)>,
    ) -> Result<Content> {
        let category: ContentCategory = category.parse()?;
        self.generate_request(GenerationRequest::with_parameters(category, parameters))
            .await
    }

    pub async fn generate_npc(&self, location: &str, importance: &str) -> Result<Content> {
        self.generate(
            ContentCategory::Npc,
            [("location", location), ("importance", importance)],
        )
        .await
    }

    pub async fn generate_quest(&self, location: &str, difficulty: &str) -> Result<Content> {
        self.generate(
            ContentCategory::Quest,
            [("location", location), ("difficulty", difficulty)],
        )
        .await
    }

    pub async fn generate_monster(&self, location: &str, level: u32) -> Result<Content> {
        let request = GenerationRequest::new(ContentCategory::Monster)
            .param("location", location)
            .param("level", level);
        self.generate_request(request).await
    }

    pub async fn generate_item(&self, item_type: &str, rarity: &str) -> Result<Content> {
        self.generate(
            ContentCategory::Item,
            [("item_type", item_type), ("rarity", rarity)],
        )
        .await
    }

    pub async fn generate_room(&self, area: &str, theme: &str) -> Result<Content> {
        self.generate(ContentCategory::Room, [("area", area), ("theme", theme)])
            .await
    }

    /// Fallback content for a category, without touching the pipeline.
    pub fn fallback(&self, category: ContentCategory) -> Content {
        self.inner.fallbacks.fallback(category)
    }

    /// Drop every cached response.
    pub async fn clear_cache(&self) {
        self.inner.cache.clear().await;
        info!("cache cleared");
    }

    /// Snapshot of gateway health. Probes the backend.
    pub async fn status(&self) -> GatewayStatus {
        let inner = &self.inner;
        GatewayStatus {
            enabled: inner.is_enabled(),
            circuit_state: inner.circuit.state(),
            cache_connected: inner.cache.is_connected(),
            queue_size: inner.queue.len(),
            request_count_this_window: inner.limiter.count(),
            failure_count: inner.circuit.failure_count(),
            backend_reachable: inner.backend.health_check().await,
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.inner.circuit.state()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.inner.templates
    }

    /// Stop the queue consumer, release queued callers with fallback
    /// content and close the cache. Later requests get fallback content.
    pub async fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.queue.close();
        self.inner.cache.close().await;
        info!("gateway shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::Acquire)
    }
}

impl GatewayInner {
    fn is_enabled(&self) -> bool {
        self.config.enabled && !self.shut_down.load(Ordering::Acquire)
    }

    async fn run(&self, request: &GenerationRequest, admission: Admission) -> Result<Content> {
        let category = request.category();

        if !self.config.enabled {
            return Ok(self.serve_fallback(category, "disabled"));
        }
        if self.shut_down.load(Ordering::Acquire) {
            return Ok(self.serve_fallback(category, "shutdown"));
        }

        if let Err(e) = self.templates.validate(request) {
            record_request(category, "rejected");
            return Err(e);
        }

        if !self.circuit.should_attempt() {
            debug!(category = %category, "circuit open, skipping backend");
            return Ok(self.serve_fallback(category, "circuit_open"));
        }

        if admission == Admission::Check && !self.limiter.admit() {
            return Ok(self.defer(request).await);
        }

        if let Some(content) = self.cache.get(request).await {
            record_request(category, "cached");
            return Ok(content);
        }

        match self.backend.invoke(request).await {
            Ok(content) => {
                self.circuit.record_success();
                let content = self.validator.validate(category, content);
                self.cache.put(request, &content).await;
                record_request(category, "generated");
                Ok(content)
            }
            Err(e) if e.is_circuit_failure() => {
                self.circuit.record_failure();
                if self.config.fallback_on_failure {
                    warn!(category = %category, error = %e, "generation failed, serving fallback");
                    Ok(self.serve_fallback(category, "backend_failure"))
                } else {
                    record_request(category, "error");
                    Err(e)
                }
            }
            Err(e) => {
                record_request(category, "error");
                Err(e)
            }
        }
    }

    /// Park a rate-limited request and wait for the drain loop.
    async fn defer(&self, request: &GenerationRequest) -> Content {
        let category = request.category();
        match self.queue.enqueue(request.clone()) {
            Ok(deferred) => match deferred.wait().await {
                Some(content) => content,
                None => self.serve_fallback(category, "abandoned"),
            },
            Err(e) => {
                warn!(category = %category, error = %e, "rate limited and queue full, serving fallback");
                self.serve_fallback(category, "queue_overflow")
            }
        }
    }

    fn serve_fallback(&self, category: ContentCategory, reason: &'static str) -> Content {
        metrics::counter!(telemetry::FALLBACKS_TOTAL,
            "category" => category.as_str(),
            "reason" => reason,
        )
        .increment(1);
        record_request(category, "fallback");
        self.fallbacks.fallback(category)
    }
}

#[async_trait]
impl QueueProcessor for GatewayInner {
    fn admit(&self) -> bool {
        self.limiter.admit()
    }

    fn retry_after(&self) -> Duration {
        self.limiter.window()
    }

    async fn process(&self, request: &GenerationRequest) -> Content {
        match self.run(request, Admission::Granted).await {
            Ok(content) => content,
            Err(e) => {
                warn!(category = %request.category(), error = %e, "queued request failed, serving fallback");
                self.serve_fallback(request.category(), "backend_failure")
            }
        }
    }
}

fn record_request(category: ContentCategory, outcome: &'static str) {
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "category" => category.as_str(),
        "outcome" => outcome,
    )
    .increment(1);
}
