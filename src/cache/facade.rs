//! Cache Facade Module
//!
//! The public cache surface: normalizes keys, encodes and decodes values,
//! resolves TTLs and delegates physical storage to the injected engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::codec::{decode, encode, AllowList};
use crate::cache::key::normalize_key;
use crate::cache::ttl::{resolve_ttl, Ttl};
use crate::cache::value::{CacheValue, Packable};
use crate::config::CacheConfig;
use crate::engine::{default_engine, CacheEngine, Namespace};
use crate::error::Result;

// == Cache Facade ==
/// A cache namespace backed by a pluggable storage engine.
///
/// The facade is stateless across calls apart from its allow-list, performs
/// no locking or buffering of its own, and is synchronous throughout:
/// every operation delegates immediately to the engine, which owns all
/// concurrency and durability guarantees.
///
/// One instance is constructed per logical namespace and lives for the
/// process lifetime; no cached data is held in the facade itself.
pub struct Cache {
    /// Physical storage backend
    engine: Arc<dyn CacheEngine>,
    /// Storage partition all keys of this instance live in
    namespace: Namespace,
    /// TTL in seconds applied when a call omits one
    default_ttl: i64,
    /// Object types permitted on the reconstructable path; grows only
    allowed: AllowList,
}

impl Cache {
    // == Constructors ==
    /// Creates a facade with default configuration and the standard engine.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a facade with the given configuration and the standard engine.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_engine(config, default_engine())
    }

    /// Creates a facade on top of an injected engine.
    ///
    /// Engines are shared references, so several facades (each with its own
    /// namespace and allow-list) can sit on one physical store.
    pub fn with_engine(config: CacheConfig, engine: Arc<dyn CacheEngine>) -> Self {
        Self {
            engine,
            namespace: Namespace::new(config.base_dir, config.init_dir),
            default_ttl: config.default_ttl,
            allowed: AllowList::new(),
        }
    }

    /// Returns the namespace this facade writes into.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    // == Allow Object ==
    /// Registers `T` on the allow-list, permitting it to be packed by
    /// [`Cache::set`] and reconstructed by [`Cache::get`].
    ///
    /// The list starts empty (no object may be cached at all) and only ever
    /// grows for the lifetime of this instance.
    pub fn allow_object<T: Packable>(&mut self) {
        self.allowed.allow::<T>();
        debug!("Allowed object type `{}` for cache packing", T::TAG);
    }

    // == Get ==
    /// Retrieves the value stored under `key`, or [`CacheValue::Null`] on a
    /// miss.
    pub fn get(&self, key: &str) -> Result<CacheValue> {
        self.get_or(key, CacheValue::Null)
    }

    /// Retrieves the value stored under `key`, substituting `default` on a
    /// miss.
    ///
    /// The default is also substituted when the stored value decodes as
    /// empty (empty text, zero, false): a legitimately cached empty value
    /// is indistinguishable from a miss at this boundary. That sharp edge
    /// is intentional, kept for compatibility with existing consumers.
    pub fn get_or(&self, key: &str, default: CacheValue) -> Result<CacheValue> {
        let key = normalize_key(key);

        let Some(raw) = self.engine.read(&self.namespace, &key, self.default_ttl)? else {
            return Ok(default);
        };

        let value = decode(&raw, &self.allowed);
        if value.is_empty() {
            return Ok(default);
        }
        Ok(value)
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// The TTL resolves at call time: `None` falls back to the configured
    /// default, seconds pass through unchanged and calendar intervals are
    /// measured from the current instant. Success is reported once the
    /// engine call returns; the write is not double-checked.
    ///
    /// # Errors
    /// [`crate::error::CacheError::PackingNotAllowed`] when `value` is an
    /// object whose type was never registered via [`Cache::allow_object`].
    pub fn set(&self, key: &str, value: CacheValue, ttl: Option<Ttl>) -> Result<()> {
        let key = normalize_key(key);
        let payload = encode(&value, &self.allowed)?;
        let ttl_seconds = resolve_ttl(ttl.as_ref(), self.default_ttl);

        debug!("Cache write for key {} ({} s TTL)", key, ttl_seconds);
        self.engine.write(&self.namespace, &key, &payload, ttl_seconds)
    }

    // == Delete ==
    /// Removes the entry stored under `key`. Removing an absent key is a
    /// normal outcome, not an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        let key = normalize_key(key);
        self.engine.clean(&self.namespace, Some(&key))
    }

    // == Clear ==
    /// Wipes every entry in this facade's namespace.
    pub fn clear(&self) -> Result<()> {
        debug!("Clearing cache namespace {}", self.namespace);
        self.engine.clean(&self.namespace, None)
    }

    // == Has ==
    /// Returns true if the engine holds a value for `key`.
    ///
    /// Note this reports physical presence: an entry holding an empty value
    /// satisfies `has` even though [`Cache::get_or`] would substitute the
    /// default for it.
    pub fn has(&self, key: &str) -> Result<bool> {
        let key = normalize_key(key);
        let hit = self.engine.read(&self.namespace, &key, self.default_ttl)?;
        Ok(hit.is_some())
    }

    // == Get Multiple ==
    /// Retrieves each key independently; a miss on one key never affects
    /// the others. The result covers every input key.
    pub fn get_multiple<S: AsRef<str>>(
        &self,
        keys: &[S],
        default: CacheValue,
    ) -> Result<BTreeMap<String, CacheValue>> {
        let mut result = BTreeMap::new();
        for key in keys {
            let key = key.as_ref();
            result.insert(key.to_string(), self.get_or(key, default.clone())?);
        }
        Ok(result)
    }

    // == Set Multiple ==
    /// Stores each entry in order with a shared TTL, silently skipping
    /// entries with an empty key.
    ///
    /// Batches are sequential and not transactional: an encode failure
    /// (e.g. a disallowed object) aborts the batch with an error, but
    /// writes already issued for earlier entries stay applied.
    pub fn set_multiple(&self, values: &[(String, CacheValue)], ttl: Option<Ttl>) -> Result<()> {
        for (key, value) in values {
            if key.is_empty() {
                debug!("Skipping cache batch entry with empty key");
                continue;
            }
            self.set(key, value.clone(), ttl.clone())?;
        }
        Ok(())
    }

    // == Delete Multiple ==
    /// Removes each key unconditionally.
    pub fn delete_multiple<S: AsRef<str>>(&self, keys: &[S]) -> Result<()> {
        for key in keys {
            self.delete(key.as_ref())?;
        }
        Ok(())
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
