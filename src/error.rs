//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache facade and its engines.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Packing an object whose type is not on the allow-list
    #[error("Packing objects of type `{0}` is not allowed")]
    PackingNotAllowed(String),

    /// Malformed ISO-8601 calendar interval text
    #[error("Invalid calendar interval: {0}")]
    InvalidInterval(String),

    /// Object payload could not be serialized
    #[error("Value serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure reported by a storage engine
    #[error("Engine I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure reported by a storage engine
    #[error("Engine failure: {0}")]
    Engine(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache facade.
pub type Result<T> = std::result::Result<T, CacheError>;
