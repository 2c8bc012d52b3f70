//! Telemetry metric name constants.
//!
//! Centralised metric names for loregate operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `loregate_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `category` - content category (e.g. "npc", "quest")
//! - `outcome` - how a request was served: "generated", "cached", "fallback",
//!   "rejected" (invalid request) or "error"
//! - `reason` - why fallback content was used
//! - `status` - backend call outcome: "ok", "timeout" or "error"

/// Total `generate` requests handled by the gateway.
///
/// Labels: `category`, `outcome`.
pub const REQUESTS_TOTAL: &str = "loregate_requests_total";

/// Total calls issued to the generation backend.
///
/// Labels: `category`, `status` ("ok" | "timeout" | "error").
pub const BACKEND_CALLS_TOTAL: &str = "loregate_backend_calls_total";

/// Backend call duration in seconds.
///
/// Labels: `category`.
pub const BACKEND_DURATION_SECONDS: &str = "loregate_backend_duration_seconds";

/// Total cache hits.
///
/// Labels: `category`.
pub const CACHE_HITS_TOTAL: &str = "loregate_cache_hits_total";

/// Total cache misses (including errors collapsed into misses).
///
/// Labels: `category`.
pub const CACHE_MISSES_TOTAL: &str = "loregate_cache_misses_total";

/// Total cache store errors (reads and writes).
///
/// Labels: `operation` ("get" | "put").
pub const CACHE_ERRORS_TOTAL: &str = "loregate_cache_errors_total";

/// Total responses served from static fallback content.
///
/// Labels: `category`, `reason` ("disabled" | "circuit_open" | "backend_failure"
/// | "queue_overflow" | "abandoned" | "shutdown").
pub const FALLBACKS_TOTAL: &str = "loregate_fallbacks_total";

/// Total circuit breaker state transitions.
///
/// Labels: `to` ("open" | "half_open" | "closed").
pub const CIRCUIT_TRANSITIONS_TOTAL: &str = "loregate_circuit_transitions_total";

/// Total requests deferred to the request queue.
pub const QUEUE_ENQUEUED_TOTAL: &str = "loregate_queue_enqueued_total";

/// Total requests rejected because the queue was full.
pub const QUEUE_OVERFLOW_TOTAL: &str = "loregate_queue_overflow_total";

/// Current number of requests waiting in the queue.
pub const QUEUE_DEPTH: &str = "loregate_queue_depth";
