//! Cache Facade Module
//!
//! Provides the public cache surface: key normalization, value encoding with
//! an allow-list gate, TTL resolution and engine orchestration.

mod codec;
mod facade;
mod key;
mod ttl;
mod value;


// Re-export public types
pub use codec::{decode, encode, AllowList};
pub use facade::Cache;
pub use key::normalize_key;
pub use ttl::{resolve_ttl, CalendarInterval, Ttl};
pub use value::{CacheValue, Packable, PackedObject};
