//! Loregate - resilient gateway for generated game content
//!
//! This crate sits between a game server and a text-generation backend.
//! Callers ask for a piece of content (an NPC, quest, monster, item or
//! room) and always get usable JSON back: freshly generated, served from
//! cache, or a fixed fallback when the backend is slow, failing, rate
//! limited or switched off.
//!
//! # Example
//!
//! ```rust,no_run
//! use loregate::{Gateway, GatewayConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> loregate::Result<()> {
//!     let config = GatewayConfig::load(None)?;
//!     let gateway = Gateway::init(config)?;
//!
//!     let npc = gateway.generate_npc("Docks", "major").await?;
//!     println!("{}", npc.body);
//!
//!     gateway.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Custom backends
//!
//! ```rust,ignore
//! let gateway = Gateway::builder(config)
//!     .backend(Arc::new(MyBackend::new()))
//!     .cache_store(Arc::new(MyRedisStore::connect(url).await?))
//!     .build()?;
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod queue;
pub mod resilience;
pub mod telemetry;
pub mod templates;
pub mod types;
pub mod validator;

// Re-export main types at crate root
pub use backend::{GenerationBackend, HttpBackend, SamplingOptions};
pub use cache::{CacheLookup, CacheStore, MemoryCacheStore};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use fallback::FallbackProvider;
pub use gateway::{Gateway, GatewayBuilder};
pub use resilience::{CircuitBreaker, CircuitState, RateLimiter};
pub use templates::{ContentTemplate, ParamKind, ParamSpec, TemplateRegistry};
pub use types::{Content, ContentCategory, GatewayStatus, GenerationRequest, ParamValue};

/// Crate version, reported by the CLI.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
