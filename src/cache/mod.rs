//! Caching subsystem.
//!
//! - [`CacheStore`] - storage seam with a three-way lookup result
//!   ([`CacheLookup::Found`], [`CacheLookup::NotFound`], [`CacheLookup::Error`]).
//!   [`MemoryCacheStore`] is the in-process moka-backed implementation; a
//!   shared external store (e.g. redis) plugs in through the same trait.
//!
//! - [`ResponseCache`] - the boundary the gateway talks to. It derives keys
//!   from requests, applies the configured TTL, and collapses store errors
//!   into misses and no-ops while logging them, so cache instability never
//!   reaches callers.

mod response;
mod store;

pub use response::ResponseCache;
pub use store::{CacheLookup, CacheStore, MemoryCacheStore};
