//! In-Memory Engine Module
//!
//! The default storage engine: per-namespace entry maps with TTL expiration,
//! optional LRU eviction and access statistics, all behind a single mutex.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::debug;

use crate::engine::{CacheEngine, Namespace};
use crate::error::Result;

// == Stored Entry ==
/// A single stored payload with its expiration deadline.
#[derive(Debug, Clone)]
struct StoredEntry {
    /// The stored payload
    payload: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
}

impl StoredEntry {
    /// Creates an entry from a payload and the resolved TTL.
    ///
    /// TTLs of zero or less mean the entry never expires; the facade passes
    /// them through unvalidated and this engine's tolerance is to keep the
    /// entry.
    fn new(payload: &str, ttl_seconds: i64) -> Self {
        let expires_at = u64::try_from(ttl_seconds)
            .ok()
            .filter(|ttl| *ttl > 0)
            .map(|ttl| current_timestamp_ms() + ttl * 1000);

        Self {
            payload: payload.to_string(),
            expires_at,
        }
    }

    /// An entry is expired once the current time reaches its deadline.
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Access Tracker ==
/// Tracks access order for LRU eviction.
///
/// Front = most recently used, back = least recently used.
#[derive(Debug, Default)]
struct AccessTracker {
    order: VecDeque<String>,
}

impl AccessTracker {
    /// Marks a key as recently used, adding it if new.
    fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    /// Drops a key from the tracking order.
    fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    /// Removes and returns the least recently used key.
    fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }
}

// == Engine Stats ==
/// Access statistics for one [`MemoryEngine`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineStats {
    /// Reads that returned a live entry
    pub hits: u64,
    /// Reads that found nothing
    pub misses: u64,
    /// Entries dropped to make room under a capacity bound
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Current number of live entries across all namespaces
    pub entries: usize,
}

impl EngineStats {
    /// Hit rate over all reads so far, 0.0 when nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Namespace Space ==
/// Entries and access order for one namespace.
#[derive(Debug, Default)]
struct Space {
    entries: HashMap<String, StoredEntry>,
    access: AccessTracker,
}

// == Memory Engine ==
/// The default in-process storage engine.
///
/// Entries live in per-namespace maps behind one mutex, which is the whole
/// concurrency story: callers on any thread serialize on it. Expired
/// entries are dropped lazily when read and in bulk via
/// [`MemoryEngine::purge_expired`]. With a capacity bound, each namespace
/// evicts its least recently used entry to make room.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    inner: Mutex<Inner>,
    /// Per-namespace entry limit, None = unbounded
    capacity: Option<usize>,
}

#[derive(Debug, Default)]
struct Inner {
    spaces: HashMap<Namespace, Space>,
    stats: EngineStats,
}

impl MemoryEngine {
    // == Constructors ==
    /// Creates an unbounded engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine holding at most `capacity` entries per namespace,
    /// evicting the least recently used entry when full.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::default(),
            capacity: Some(capacity),
        }
    }

    // == Stats ==
    /// Returns a snapshot of the access statistics.
    pub fn stats(&self) -> EngineStats {
        let inner = self.inner.lock().expect("engine lock poisoned");
        let mut stats = inner.stats.clone();
        stats.entries = inner.spaces.values().map(|s| s.entries.len()).sum();
        stats
    }

    // == Purge Expired ==
    /// Removes every expired entry from every namespace.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().expect("engine lock poisoned");
        let mut removed = 0;

        for space in inner.spaces.values_mut() {
            let expired: Vec<String> = space
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_expired())
                .map(|(key, _)| key.clone())
                .collect();

            for key in expired {
                space.entries.remove(&key);
                space.access.remove(&key);
                removed += 1;
            }
        }

        inner.stats.expirations += removed as u64;
        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }
}

impl CacheEngine for MemoryEngine {
    /// Reads a stored payload.
    ///
    /// The caller's `ttl_seconds` hint is ignored: entries carry their own
    /// deadlines fixed at write time.
    fn read(&self, ns: &Namespace, key: &str, _ttl_seconds: i64) -> Result<Option<String>> {
        let mut guard = self.inner.lock().expect("engine lock poisoned");
        let inner = &mut *guard;

        let Some(space) = inner.spaces.get_mut(ns) else {
            inner.stats.misses += 1;
            return Ok(None);
        };

        match space.entries.get(key).map(StoredEntry::is_expired) {
            Some(true) => {
                space.entries.remove(key);
                space.access.remove(key);
                inner.stats.expirations += 1;
                inner.stats.misses += 1;
                Ok(None)
            }
            Some(false) => {
                let payload = space.entries.get(key).map(|entry| entry.payload.clone());
                space.access.touch(key);
                inner.stats.hits += 1;
                Ok(payload)
            }
            None => {
                inner.stats.misses += 1;
                Ok(None)
            }
        }
    }

    fn write(&self, ns: &Namespace, key: &str, payload: &str, ttl_seconds: i64) -> Result<()> {
        let mut inner = self.inner.lock().expect("engine lock poisoned");
        let capacity = self.capacity;

        let mut evicted = false;
        let space = inner.spaces.entry(ns.clone()).or_default();

        // At capacity, a brand new key pushes out the least recently used one
        if let Some(capacity) = capacity {
            if !space.entries.contains_key(key) && space.entries.len() >= capacity {
                if let Some(oldest) = space.access.evict_oldest() {
                    space.entries.remove(&oldest);
                    evicted = true;
                    debug!("Evicted least recently used key {} from {}", oldest, ns);
                }
            }
        }

        space.entries.insert(key.to_string(), StoredEntry::new(payload, ttl_seconds));
        space.access.touch(key);

        if evicted {
            inner.stats.evictions += 1;
        }
        Ok(())
    }

    fn clean(&self, ns: &Namespace, key: Option<&str>) -> Result<()> {
        let mut inner = self.inner.lock().expect("engine lock poisoned");

        match key {
            Some(key) => {
                if let Some(space) = inner.spaces.get_mut(ns) {
                    space.entries.remove(key);
                    space.access.remove(key);
                }
            }
            None => {
                inner.spaces.remove(ns);
                debug!("Wiped cache namespace {}", ns);
            }
        }
        Ok(())
    }
}
