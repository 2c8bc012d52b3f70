//! Builder for configuring gateway instances

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::info;

use super::{Gateway, GatewayInner};
use crate::backend::{BackendClient, GenerationBackend, HttpBackend};
use crate::cache::{CacheStore, MemoryCacheStore, ResponseCache};
use crate::config::GatewayConfig;
use crate::fallback::FallbackProvider;
use crate::queue::RequestQueue;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, RateLimiter};
use crate::templates::TemplateRegistry;
use crate::validator::Validator;
use crate::{GatewayError, Result};

/// Builder for [`Gateway`].
///
/// Every collaborator has a default derived from the config: an
/// [`HttpBackend`] on `backend_endpoint`, a [`MemoryCacheStore`] bounded by
/// `cache_max_entries` and the built-in templates.
pub struct GatewayBuilder {
    config: GatewayConfig,
    backend: Option<Arc<dyn GenerationBackend>>,
    cache_store: Option<Arc<dyn CacheStore>>,
    templates: Option<TemplateRegistry>,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            backend: None,
            cache_store: None,
            templates: None,
        }
    }

    /// Use a custom generation backend.
    pub fn backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use a custom cache store, e.g. a shared external cache.
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    /// Replace the template registry.
    pub fn templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Build the gateway and start its queue consumer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Gateway> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            GatewayError::Configuration(
                "the gateway must be initialized inside a tokio runtime".to_string(),
            )
        })?;

        let config = self.config.check()?;
        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(HttpBackend::new(&config.backend_endpoint)?),
        };
        let store = self.cache_store.unwrap_or_else(|| {
            Arc::new(MemoryCacheStore::with_max_entries(config.cache_max_entries))
        });
        let templates = Arc::new(self.templates.unwrap_or_else(TemplateRegistry::with_defaults));

        let backend_name = backend.name().to_string();
        let store_name = store.name().to_string();

        let client = BackendClient::new(
            backend,
            templates.clone(),
            config.model_id.clone(),
            config.request_timeout,
            config.sampling.clone(),
        );
        let circuit = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: config.failure_threshold,
            reset_timeout: config.circuit_reset_timeout,
        });
        let limiter = RateLimiter::new(config.rate_limit_per_window, config.rate_window);
        let (queue, receiver) = RequestQueue::new(config.queue_max_size, config.queue_drain_delay);

        let inner = Arc::new(GatewayInner {
            cache: ResponseCache::new(store, config.cache_ttl),
            validator: Validator::new(templates.clone()),
            fallbacks: FallbackProvider::new(),
            backend: client,
            templates,
            circuit,
            limiter,
            queue,
            shut_down: AtomicBool::new(false),
            config,
        });
        if let Some(receiver) = receiver {
            inner
                .queue
                .start(receiver, Arc::downgrade(&inner), &runtime);
        }

        info!(
            enabled = inner.config.enabled,
            backend = %backend_name,
            cache = %store_name,
            model = %inner.config.model_id,
            rate_limit = inner.config.rate_limit_per_window,
            queue_capacity = inner.config.queue_max_size,
            "gateway initialized"
        );
        Ok(Gateway { inner })
    }
}
