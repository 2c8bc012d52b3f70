//! Gateway configuration.
//!
//! [`GatewayConfig`] holds every tunable with its default. It can be built
//! in code with builder-style setters, or loaded with
//! [`GatewayConfig::load`], which reads a TOML file and then applies
//! environment overrides.
//!
//! File resolution order:
//! 1. Explicit path (CLI flag); must exist
//! 2. `~/.loregate/config.toml` (user)
//! 3. `/etc/loregate/config.toml` (system)
//!
//! With no file found, defaults are used. Example file:
//!
//! ```toml
//! [gateway]
//! enabled = true
//! backend_endpoint = "http://localhost:11434"
//! model_id = "llama3.2"
//! request_timeout_secs = 30
//! cache_ttl_secs = 3600
//! rate_limit_per_window = 30
//! queue_max_size = 100
//!
//! [gateway.sampling]
//! temperature = 0.7
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::backend::SamplingOptions;
use crate::{GatewayError, Result};

/// Largest accepted `queue_max_size`.
pub const MAX_QUEUE_SIZE: usize = 1_000_000;

/// Gateway configuration with the documented defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Serve fallback content only when false. Default: true.
    pub enabled: bool,
    /// Base URL of the generation backend. Default: `http://localhost:11434`.
    pub backend_endpoint: String,
    /// Model identifier sent with every call. Default: `llama3.2`.
    pub model_id: String,
    /// Deadline for one backend call. Default: 30s.
    pub request_timeout: Duration,
    /// Lifetime of cached content. Default: 1 hour.
    pub cache_ttl: Duration,
    /// Capacity of the in-memory cache. Default: 10,000.
    pub cache_max_entries: u64,
    /// Backend calls admitted per rate window. Default: 30.
    pub rate_limit_per_window: u32,
    /// Length of the fixed rate window. Default: 60s.
    pub rate_window: Duration,
    /// Requests the overflow queue holds, at most [`MAX_QUEUE_SIZE`].
    /// Default: 100.
    pub queue_max_size: usize,
    /// Pause between consecutive queue drains. Default: 100ms.
    pub queue_drain_delay: Duration,
    /// Serve fallback content instead of surfacing backend errors. Default: true.
    pub fallback_on_failure: bool,
    /// Backend failures before the circuit opens. Default: 5.
    pub failure_threshold: u32,
    /// Time the circuit stays open before probing. Default: 60s.
    pub circuit_reset_timeout: Duration,
    /// Sampling options sent with every call.
    pub sampling: SamplingOptions,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend_endpoint: crate::backend::DEFAULT_BASE_URL.to_string(),
            model_id: "llama3.2".to_string(),
            request_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(3600),
            cache_max_entries: 10_000,
            rate_limit_per_window: 30,
            rate_window: Duration::from_secs(60),
            queue_max_size: 100,
            queue_drain_delay: Duration::from_millis(100),
            fallback_on_failure: true,
            failure_threshold: 5,
            circuit_reset_timeout: Duration::from_secs(60),
            sampling: SamplingOptions::default(),
        }
    }
}

impl GatewayConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn backend_endpoint(mut self, url: impl Into<String>) -> Self {
        self.backend_endpoint = url.into();
        self
    }

    pub fn model_id(mut self, model: impl Into<String>) -> Self {
        self.model_id = model.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_max_entries(mut self, n: u64) -> Self {
        self.cache_max_entries = n;
        self
    }

    pub fn rate_limit_per_window(mut self, n: u32) -> Self {
        self.rate_limit_per_window = n;
        self
    }

    pub fn rate_window(mut self, window: Duration) -> Self {
        self.rate_window = window;
        self
    }

    pub fn queue_max_size(mut self, n: usize) -> Self {
        self.queue_max_size = n;
        self
    }

    pub fn queue_drain_delay(mut self, delay: Duration) -> Self {
        self.queue_drain_delay = delay;
        self
    }

    pub fn fallback_on_failure(mut self, enabled: bool) -> Self {
        self.fallback_on_failure = enabled;
        self
    }

    pub fn failure_threshold(mut self, n: u32) -> Self {
        self.failure_threshold = n;
        self
    }

    pub fn circuit_reset_timeout(mut self, timeout: Duration) -> Self {
        self.circuit_reset_timeout = timeout;
        self
    }

    pub fn sampling(mut self, sampling: SamplingOptions) -> Self {
        self.sampling = sampling;
        self
    }

    /// Load from the standard file locations, then apply `LOREGATE_*`
    /// environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let config = match resolve_config_path(explicit_path)? {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|e| {
                    GatewayError::Configuration(format!("Failed to read config file {path:?}: {e}"))
                })?;
                Self::from_toml_str(&content).map_err(|e| match e {
                    GatewayError::Configuration(msg) => {
                        GatewayError::Configuration(format!("{path:?}: {msg}"))
                    }
                    other => other,
                })?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Parse a TOML document, filling unspecified values with defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content)
            .map_err(|e| GatewayError::Configuration(format!("Failed to parse config: {e}")))?;
        file.gateway.apply(Self::default()).check()
    }

    /// Reject values the gateway cannot be built with.
    pub fn check(self) -> Result<Self> {
        if self.queue_max_size > MAX_QUEUE_SIZE {
            return Err(GatewayError::Configuration(format!(
                "queue_max_size {} exceeds the maximum of {MAX_QUEUE_SIZE}",
                self.queue_max_size
            )));
        }
        Ok(self)
    }

    /// Apply overrides read through `lookup` (normally the process
    /// environment). Malformed values are rejected.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LOREGATE_ENABLED") {
            self.enabled = parse_env("LOREGATE_ENABLED", &v)?;
        }
        if let Some(v) = lookup("LOREGATE_BACKEND_URL") {
            self.backend_endpoint = v;
        }
        if let Some(v) = lookup("LOREGATE_MODEL") {
            self.model_id = v;
        }
        if let Some(v) = lookup("LOREGATE_REQUEST_TIMEOUT_SECS") {
            let secs = parse_env("LOREGATE_REQUEST_TIMEOUT_SECS", &v)?;
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("LOREGATE_CACHE_TTL_SECS") {
            self.cache_ttl = Duration::from_secs(parse_env("LOREGATE_CACHE_TTL_SECS", &v)?);
        }
        if let Some(v) = lookup("LOREGATE_RATE_LIMIT") {
            self.rate_limit_per_window = parse_env("LOREGATE_RATE_LIMIT", &v)?;
        }
        if let Some(v) = lookup("LOREGATE_QUEUE_MAX") {
            self.queue_max_size = parse_env("LOREGATE_QUEUE_MAX", &v)?;
        }
        if let Some(v) = lookup("LOREGATE_FALLBACK_ON_FAILURE") {
            self.fallback_on_failure = parse_env("LOREGATE_FALLBACK_ON_FAILURE", &v)?;
        }
        if let Some(v) = lookup("LOREGATE_FAILURE_THRESHOLD") {
            self.failure_threshold = parse_env("LOREGATE_FAILURE_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("LOREGATE_CIRCUIT_RESET_SECS") {
            let secs = parse_env("LOREGATE_CIRCUIT_RESET_SECS", &v)?;
            self.circuit_reset_timeout = Duration::from_secs(secs);
        }
        self.check()
    }
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| GatewayError::Configuration(format!("Invalid value for {key}: {raw:?}")))
}

/// Resolve the config file path, or `None` when no file exists.
fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(GatewayError::Configuration(format!(
            "Config file not found: {path:?}"
        )));
    }

    // User config
    if let Some(home) = dirs::home_dir() {
        let user_config = home.join(".loregate").join("config.toml");
        if user_config.exists() {
            return Ok(Some(user_config));
        }
    }

    // System config
    let system_config = PathBuf::from("/etc/loregate/config.toml");
    if system_config.exists() {
        return Ok(Some(system_config));
    }

    Ok(None)
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    gateway: GatewaySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GatewaySection {
    enabled: Option<bool>,
    backend_endpoint: Option<String>,
    model_id: Option<String>,
    request_timeout_secs: Option<u64>,
    cache_ttl_secs: Option<u64>,
    cache_max_entries: Option<u64>,
    rate_limit_per_window: Option<u32>,
    rate_window_secs: Option<u64>,
    queue_max_size: Option<usize>,
    queue_drain_delay_ms: Option<u64>,
    fallback_on_failure: Option<bool>,
    failure_threshold: Option<u32>,
    circuit_reset_timeout_secs: Option<u64>,
    #[serde(default)]
    sampling: SamplingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SamplingSection {
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_tokens: Option<u32>,
}

impl GatewaySection {
    fn apply(self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(v) = self.enabled {
            config.enabled = v;
        }
        if let Some(v) = self.backend_endpoint {
            config.backend_endpoint = v;
        }
        if let Some(v) = self.model_id {
            config.model_id = v;
        }
        if let Some(v) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(v);
        }
        if let Some(v) = self.cache_ttl_secs {
            config.cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = self.cache_max_entries {
            config.cache_max_entries = v;
        }
        if let Some(v) = self.rate_limit_per_window {
            config.rate_limit_per_window = v;
        }
        if let Some(v) = self.rate_window_secs {
            config.rate_window = Duration::from_secs(v);
        }
        if let Some(v) = self.queue_max_size {
            config.queue_max_size = v;
        }
        if let Some(v) = self.queue_drain_delay_ms {
            config.queue_drain_delay = Duration::from_millis(v);
        }
        if let Some(v) = self.fallback_on_failure {
            config.fallback_on_failure = v;
        }
        if let Some(v) = self.failure_threshold {
            config.failure_threshold = v;
        }
        if let Some(v) = self.circuit_reset_timeout_secs {
            config.circuit_reset_timeout = Duration::from_secs(v);
        }
        if let Some(v) = self.sampling.temperature {
            config.sampling.temperature = v;
        }
        if let Some(v) = self.sampling.top_p {
            config.sampling.top_p = v;
        }
        if let Some(v) = self.sampling.max_tokens {
            config.sampling.max_tokens = v;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let config = GatewayConfig::default();
        assert!(config.enabled);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.rate_limit_per_window, 30);
        assert_eq!(config.rate_window, Duration::from_secs(60));
        assert_eq!(config.queue_max_size, 100);
        assert!(config.fallback_on_failure);
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.circuit_reset_timeout, Duration::from_secs(60));
    }

    #[test]
    fn parse_minimal_config() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [gateway]
            model_id = "mistral"
        "#,
        )
        .unwrap();
        assert_eq!(config.model_id, "mistral");
        // Defaults preserved
        assert_eq!(config.queue_max_size, 100);
    }

    #[test]
    fn parse_empty_config() {
        let config = GatewayConfig::from_toml_str("").unwrap();
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [gateway]
            enabled = false
            backend_endpoint = "http://gpu-box:11434"
            model_id = "mistral"
            request_timeout_secs = 10
            cache_ttl_secs = 60
            cache_max_entries = 500
            rate_limit_per_window = 5
            rate_window_secs = 30
            queue_max_size = 0
            queue_drain_delay_ms = 250
            fallback_on_failure = false
            failure_threshold = 2
            circuit_reset_timeout_secs = 15

            [gateway.sampling]
            temperature = 0.2
            max_tokens = 256
        "#,
        )
        .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.backend_endpoint, "http://gpu-box:11434");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_max_entries, 500);
        assert_eq!(config.rate_limit_per_window, 5);
        assert_eq!(config.rate_window, Duration::from_secs(30));
        assert_eq!(config.queue_max_size, 0);
        assert_eq!(config.queue_drain_delay, Duration::from_millis(250));
        assert!(!config.fallback_on_failure);
        assert_eq!(config.failure_threshold, 2);
        assert_eq!(config.circuit_reset_timeout, Duration::from_secs(15));
        assert_eq!(config.sampling.temperature, 0.2);
        assert_eq!(config.sampling.max_tokens, 256);
        assert_eq!(config.sampling.top_p, SamplingOptions::default().top_p);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = GatewayConfig::from_toml_str(
            r#"
            [gateway]
            rate_limit = 3
        "#,
        );
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LOREGATE_ENABLED", "false"),
            ("LOREGATE_RATE_LIMIT", "1"),
            ("LOREGATE_CACHE_TTL_SECS", "5"),
            ("LOREGATE_MODEL", "phi3"),
        ]);
        let config = GatewayConfig::default()
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.rate_limit_per_window, 1);
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.model_id, "phi3");
    }

    #[test]
    fn malformed_env_value_is_rejected() {
        let result = GatewayConfig::default().apply_env(|key| {
            (key == "LOREGATE_QUEUE_MAX").then(|| "lots".to_string())
        });
        let err = result.unwrap_err().to_string();
        assert!(err.contains("LOREGATE_QUEUE_MAX"));
    }

    #[test]
    fn oversized_queue_is_rejected() {
        let result = GatewayConfig::default().apply_env(|key| {
            (key == "LOREGATE_QUEUE_MAX").then(|| usize::MAX.to_string())
        });
        assert!(matches!(result, Err(GatewayError::Configuration(_))));

        let result = GatewayConfig::from_toml_str("[gateway]\nqueue_max_size = 2000000\n");
        assert!(matches!(result, Err(GatewayError::Configuration(_))));

        let config = GatewayConfig::from_toml_str("[gateway]\nqueue_max_size = 1000000\n");
        assert_eq!(config.unwrap().queue_max_size, MAX_QUEUE_SIZE);
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = GatewayConfig::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[gateway]\nqueue_max_size = 7\n").unwrap();

        let config = GatewayConfig::load(Some(&path)).unwrap();
        assert_eq!(config.queue_max_size, 7);
    }
}
