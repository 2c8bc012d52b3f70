//! Generation backend access.
//!
//! - [`GenerationBackend`] - the seam to the external text-generation
//!   service; [`HttpBackend`] talks to an Ollama-compatible HTTP API
//! - [`BackendClient`] - renders the category template, issues one call
//!   bounded by the request timeout, and turns the reply into [`Content`](crate::Content)

mod client;
mod http;
mod traits;

pub use client::BackendClient;
pub use http::{DEFAULT_BASE_URL, HttpBackend};
pub use traits::{BackendRequest, GenerationBackend, SamplingOptions};
