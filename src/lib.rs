//! Plugcache - a cache facade over pluggable storage engines
//!
//! Provides a uniform get/set/delete/has/bulk surface on top of any storage
//! engine implementing [`CacheEngine`]. The facade owns key normalization,
//! value encoding (with an allow-list gate for reconstructable objects) and
//! TTL resolution; physical storage, durability and eviction belong to the
//! injected engine.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;

pub use cache::{
    normalize_key, AllowList, Cache, CacheValue, CalendarInterval, Packable, PackedObject, Ttl,
};
pub use config::CacheConfig;
pub use engine::{default_engine, CacheEngine, MemoryEngine, Namespace};
pub use error::{CacheError, Result};
