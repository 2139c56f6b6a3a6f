//! Storage Engine Module
//!
//! Defines the narrow contract every storage backend satisfies, the
//! namespace pair scoping all keys, and the default engine factory.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

mod memory;

// Re-export public types
pub use memory::{EngineStats, MemoryEngine};

// == Namespace ==
/// The storage partition one facade instance writes into.
///
/// Fixed at facade construction and passed to every engine call; never part
/// of the per-call key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// First path-like segment
    pub base_dir: String,
    /// Second path-like segment
    pub init_dir: String,
}

impl Namespace {
    /// Creates a namespace from its two segments.
    pub fn new(base_dir: impl Into<String>, init_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            init_dir: init_dir.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.init_dir.is_empty() {
            write!(f, "{}", self.base_dir)
        } else {
            write!(f, "{}:{}", self.base_dir, self.init_dir)
        }
    }
}

// == Cache Engine Trait ==
/// Contract for pluggable storage backends.
///
/// The engine owns physical storage, durability, eviction and all
/// concurrency guarantees; the facade adds no locking of its own and is
/// thread-safe exactly to the extent the engine is. Engines report failures
/// as [`crate::error::CacheError::Io`] or [`crate::error::CacheError::Engine`];
/// the facade passes them through untranslated.
pub trait CacheEngine: Send + Sync {
    /// Reads the payload stored under `key`, or None on a miss.
    ///
    /// `ttl_seconds` is the reader's TTL hint for engines that derive
    /// expiry from storage metadata; engines whose entries carry their own
    /// deadlines may ignore it.
    fn read(&self, ns: &Namespace, key: &str, ttl_seconds: i64) -> Result<Option<String>>;

    /// Stores `payload` under `key` with the given TTL.
    fn write(&self, ns: &Namespace, key: &str, payload: &str, ttl_seconds: i64) -> Result<()>;

    /// Removes one key, or the whole namespace when `key` is None.
    fn clean(&self, ns: &Namespace, key: Option<&str>) -> Result<()>;
}

// == Default Engine Factory ==
/// Returns the standard engine used when none is injected: an unbounded
/// in-memory engine.
///
/// Engines are handed out shared so several facade instances (each with its
/// own namespace and allow-list) can sit on one physical store.
pub fn default_engine() -> Arc<dyn CacheEngine> {
    Arc::new(MemoryEngine::new())
}
