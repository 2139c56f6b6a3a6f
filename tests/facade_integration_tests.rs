//! Integration Tests for the Cache Facade
//!
//! Exercises the public surface end to end against the in-memory engine:
//! lifecycle, key aliasing, the allow-list gate, TTL expiry and namespace
//! isolation.

use std::sync::{Arc, Once};
use std::thread::sleep;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;

use plugcache::{Cache, CacheConfig, CacheValue, MemoryEngine, Packable, Ttl};

// == Helper Functions ==

static TRACING: Once = Once::new();

/// Installs a tracing subscriber once for the whole test binary.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "plugcache=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

fn test_config(init_dir: &str) -> CacheConfig {
    CacheConfig {
        default_ttl: 300,
        base_dir: "/it/cache".to_string(),
        init_dir: init_dir.to_string(),
    }
}

fn create_test_cache() -> Cache {
    init_tracing();
    Cache::with_engine(test_config(""), Arc::new(MemoryEngine::new()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UserProfile {
    id: u64,
    name: String,
    roles: Vec<String>,
}

impl Packable for UserProfile {
    const TAG: &'static str = "user-profile";
}

fn sample_profile() -> UserProfile {
    UserProfile {
        id: 42,
        name: "Zoe".to_string(),
        roles: vec!["admin".to_string(), "editor".to_string()],
    }
}

// == Lifecycle Tests ==

#[test]
fn test_full_lifecycle() -> Result<()> {
    let cache = create_test_cache();

    cache.set("user/name", "zoe".into(), None)?;
    assert!(cache.has("user/name")?);
    assert_eq!(cache.get("user/name")?, CacheValue::Text("zoe".to_string()));

    cache.delete("user/name")?;
    assert!(!cache.has("user/name")?);
    assert_eq!(cache.get_or("user/name", 5.into())?, CacheValue::Int(5));
    Ok(())
}

#[test]
fn test_key_spellings_share_one_entry() -> Result<()> {
    let cache = create_test_cache();

    cache.set("a/b", "first".into(), None)?;
    cache.set("/a//b", "second".into(), None)?;

    // Both spellings hit the same physical key; the second write wins
    assert_eq!(cache.get("a//b")?, CacheValue::Text("second".to_string()));
    Ok(())
}

#[test]
fn test_structured_data_round_trip() -> Result<()> {
    let cache = create_test_cache();
    let doc = json!({"page": 3, "tags": ["a", "b"], "nested": {"ok": true}});

    cache.set("listing", doc.clone().into(), None)?;
    assert_eq!(cache.get("listing")?, CacheValue::Json(doc));
    Ok(())
}

// == Allow-List Gate Tests ==

#[test]
fn test_object_gate_end_to_end() -> Result<()> {
    init_tracing();
    let engine = Arc::new(MemoryEngine::new());
    let mut writer = Cache::with_engine(test_config(""), engine.clone());

    // Packing before registration must fail, and nothing is written
    let value = CacheValue::object(&sample_profile())?;
    assert!(writer.set("profile", value.clone(), None).is_err());
    assert!(!writer.has("profile")?);

    // Registration makes the same call succeed
    writer.allow_object::<UserProfile>();
    writer.set("profile", value, None)?;

    let stored = writer.get("profile")?;
    let profile = stored
        .as_object()
        .and_then(|obj| obj.unpack::<UserProfile>())
        .expect("stored profile should reconstruct");
    assert_eq!(profile, sample_profile());

    // A facade on the same engine without the registration must not
    // reconstruct the stored envelope
    let reader = Cache::with_engine(test_config(""), engine);
    assert!(reader.get("profile")?.as_object().is_none());
    Ok(())
}

#[test]
fn test_facades_with_different_allow_lists_coexist() -> Result<()> {
    init_tracing();
    let engine = Arc::new(MemoryEngine::new());

    let mut sessions = Cache::with_engine(test_config("sessions"), engine.clone());
    sessions.allow_object::<UserProfile>();
    let plain = Cache::with_engine(test_config("plain"), engine);

    sessions.set("p", CacheValue::object(&sample_profile())?, None)?;
    plain.set("p", "just text".into(), None)?;

    // Separate namespaces, separate policies, one engine
    assert!(sessions.get("p")?.as_object().is_some());
    assert_eq!(plain.get("p")?, CacheValue::Text("just text".to_string()));
    Ok(())
}

// == Empty-Value Policy Tests ==

#[test]
fn test_cached_empty_string_reads_as_default() -> Result<()> {
    let cache = create_test_cache();

    cache.set("k", "".into(), None)?;

    // Physically present, but indistinguishable from a miss on read
    assert!(cache.has("k")?);
    assert_eq!(cache.get_or("k", 7.into())?, CacheValue::Int(7));
    Ok(())
}

// == TTL Tests ==

#[test]
fn test_explicit_ttl_expires_entry() -> Result<()> {
    let cache = create_test_cache();

    cache.set("short", "v".into(), Some(Ttl::Seconds(1)))?;
    assert!(cache.has("short")?);

    sleep(Duration::from_millis(1100));
    assert!(!cache.has("short")?);
    Ok(())
}

#[test]
fn test_interval_ttl_expires_entry() -> Result<()> {
    let cache = create_test_cache();

    cache.set("short", "v".into(), Some(Ttl::Interval("PT1S".parse()?)))?;
    assert!(cache.has("short")?);

    sleep(Duration::from_millis(1100));
    assert!(!cache.has("short")?);
    Ok(())
}

#[test]
fn test_default_ttl_keeps_entry_alive() -> Result<()> {
    // Default TTL is 300 s here, far beyond the test window
    let cache = create_test_cache();

    cache.set("long", "v".into(), None)?;
    sleep(Duration::from_millis(100));
    assert!(cache.has("long")?);
    Ok(())
}

// == Batch Tests ==

#[test]
fn test_batch_operations() -> Result<()> {
    let cache = create_test_cache();

    cache.set_multiple(
        &[
            ("a".to_string(), "1".into()),
            (String::new(), "skipped".into()),
            ("b".to_string(), "2".into()),
        ],
        None,
    )?;

    let values = cache.get_multiple(&["a", "b", "c"], CacheValue::Null)?;
    assert_eq!(values.len(), 3);
    assert_eq!(values["a"], CacheValue::Int(1));
    assert_eq!(values["b"], CacheValue::Int(2));
    assert_eq!(values["c"], CacheValue::Null);

    cache.delete_multiple(&["a", "b"])?;
    assert!(!cache.has("a")?);
    assert!(!cache.has("b")?);
    Ok(())
}

// == Namespace Tests ==

#[test]
fn test_clear_empties_own_namespace_only() -> Result<()> {
    init_tracing();
    let engine = Arc::new(MemoryEngine::new());
    let first = Cache::with_engine(test_config("one"), engine.clone());
    let second = Cache::with_engine(test_config("two"), engine);

    first.set("a", "1".into(), None)?;
    first.set("b", "2".into(), None)?;
    second.set("a", "other".into(), None)?;

    first.clear()?;

    assert!(!first.has("a")?);
    assert!(!first.has("b")?);
    assert!(second.has("a")?);
    Ok(())
}
