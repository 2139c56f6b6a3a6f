//! Value Codec Module
//!
//! Encodes cache values into the string payloads engines store, and decodes
//! whatever an engine returns. Reconstructable objects are gated by the
//! allow-list on both sides: packing a non-registered type is an error, and
//! a stored envelope referencing a non-registered tag is never reconstructed.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::cache::value::{CacheValue, Packable, PackedObject};
use crate::error::{CacheError, Result};

// == Envelope Format ==
/// Marker opening a packed-object envelope.
///
/// The control character keeps the envelope from ever parsing as JSON, so
/// the decoder can tell the reconstructable path apart from ordinary data.
/// Full envelope layout: marker, tag, newline, JSON payload.
const OBJECT_MARKER: &str = "\u{1}obj\u{1}";

// == Allow List ==
/// Registry of object types permitted on the reconstructable path.
///
/// Each registration stores the type's tag together with a payload probe
/// that checks a stored payload actually deserializes as that type. The
/// list is owned by one facade instance, starts empty (no object may be
/// cached at all) and only ever grows.
#[derive(Debug, Default)]
pub struct AllowList {
    probes: HashMap<&'static str, fn(&JsonValue) -> bool>,
}

impl AllowList {
    /// Creates an empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Allow ==
    /// Registers `T` for packing and reconstruction.
    ///
    /// Registering the same type again is a no-op.
    pub fn allow<T: Packable>(&mut self) {
        self.probes.insert(T::TAG, probe_payload::<T>);
    }

    /// Returns true if no type has been registered.
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Returns true if `tag` belongs to a registered type.
    pub fn is_allowed(&self, tag: &str) -> bool {
        self.probes.contains_key(tag)
    }

    /// Runs the registered probe for `tag` against a stored payload.
    fn probe(&self, tag: &str, payload: &JsonValue) -> bool {
        self.probes.get(tag).is_some_and(|probe| probe(payload))
    }
}

/// Payload probe for a registered type: the payload must deserialize as `T`.
fn probe_payload<T: Packable>(payload: &JsonValue) -> bool {
    serde_json::from_value::<T>(payload.clone()).is_ok()
}

// == Encode ==
/// Encodes a value into the string payload handed to the engine.
///
/// Objects must be allow-listed and become a tagged envelope; sequences and
/// mappings become JSON text; scalars pass through as their raw textual
/// form (null as the empty string).
///
/// # Errors
/// [`CacheError::PackingNotAllowed`] when the object's type is not on the
/// allow-list. There is no silent fallback for disallowed objects.
pub fn encode(value: &CacheValue, allowed: &AllowList) -> Result<String> {
    match value {
        CacheValue::Object(obj) => {
            if !allowed.is_allowed(obj.tag()) {
                return Err(CacheError::PackingNotAllowed(obj.tag().to_string()));
            }
            let payload = serde_json::to_string(obj.payload())?;
            Ok(format!("{OBJECT_MARKER}{}\n{payload}", obj.tag()))
        }
        CacheValue::Json(json) => Ok(serde_json::to_string(json)?),
        CacheValue::Text(s) => Ok(s.clone()),
        CacheValue::Int(i) => Ok(i.to_string()),
        CacheValue::Float(f) => Ok(match serde_json::Number::from_f64(*f) {
            Some(n) => n.to_string(),
            // Non-finite floats have no JSON form; store their plain text
            None => f.to_string(),
        }),
        CacheValue::Bool(b) => Ok(b.to_string()),
        CacheValue::Null => Ok(String::new()),
    }
}

// == Decode ==
/// Decodes a stored payload back into a value. Total: every input decodes
/// to something.
///
/// Attempted in order: packed-object envelope (only when the allow-list is
/// non-empty, and failing safe on unknown tags or mismatched payloads),
/// then JSON, then the raw bytes as a literal text scalar.
///
/// Scalars are re-typed through the JSON attempt, so text that parses as
/// JSON comes back typed: a stored `"42"` decodes as an integer.
pub fn decode(raw: &str, allowed: &AllowList) -> CacheValue {
    if !allowed.is_empty() {
        if let Some(obj) = decode_object(raw, allowed) {
            return CacheValue::Object(obj);
        }
    }

    match serde_json::from_str::<JsonValue>(raw) {
        Ok(json) => CacheValue::from_json(json),
        Err(_) => CacheValue::Text(raw.to_string()),
    }
}

/// Attempts to decode a packed-object envelope.
///
/// Returns None (fall through to the other decode paths) unless the marker
/// is present, the tag is registered and the payload passes the registered
/// probe.
fn decode_object(raw: &str, allowed: &AllowList) -> Option<PackedObject> {
    let body = raw.strip_prefix(OBJECT_MARKER)?;
    let (tag, payload_text) = body.split_once('\n')?;

    if !allowed.is_allowed(tag) {
        return None;
    }

    let payload: JsonValue = serde_json::from_str(payload_text).ok()?;
    if !allowed.probe(tag, &payload) {
        return None;
    }

    Some(PackedObject::from_parts(tag.to_string(), payload))
}
