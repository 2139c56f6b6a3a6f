//! Cache Value Module
//!
//! Defines the tagged value type travelling through the facade and the
//! packing contract for reconstructable objects.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::Result;

// == Packable ==
/// Contract for object types that may be cached via the reconstructable
/// (non-JSON) path.
///
/// The tag identifies the type inside the stored envelope; it must stay
/// stable across versions or previously cached objects stop reconstructing.
/// Implementing the trait does not by itself permit caching - the type must
/// also be registered on the facade's allow-list.
pub trait Packable: Serialize + DeserializeOwned {
    /// Stable type tag written into the packed envelope
    const TAG: &'static str;
}

// == Packed Object ==
/// An allow-listable object in packed form: a type tag plus its field
/// values as a JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedObject {
    tag: String,
    payload: JsonValue,
}

impl PackedObject {
    // == Pack ==
    /// Packs a value into tag + payload form.
    ///
    /// This performs no allow-list check; the gate is applied when the
    /// facade encodes the value.
    pub fn pack<T: Packable>(value: &T) -> Result<Self> {
        Ok(Self {
            tag: T::TAG.to_string(),
            payload: serde_json::to_value(value)?,
        })
    }

    /// Rebuilds a packed object from its stored parts.
    pub(crate) fn from_parts(tag: String, payload: JsonValue) -> Self {
        Self { tag, payload }
    }

    /// Returns the type tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the packed field values.
    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    // == Unpack ==
    /// Reconstructs the original object.
    ///
    /// Returns None when the tag does not match `T` or the payload does not
    /// deserialize as `T`.
    pub fn unpack<T: Packable>(&self) -> Option<T> {
        if self.tag != T::TAG {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }
}

// == Cache Value ==
/// A value travelling through the cache facade.
///
/// Scalars reach the engine as their raw textual form, sequences and
/// mappings as JSON text, and objects as a tagged reconstructable envelope
/// gated by the allow-list.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    /// Absent value (stored as an empty payload)
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// Text scalar, stored verbatim
    Text(String),
    /// Sequence or mapping, stored as JSON
    Json(JsonValue),
    /// Allow-listed object in packed form
    Object(PackedObject),
}

impl CacheValue {
    /// Packs an object into a cacheable value.
    pub fn object<T: Packable>(value: &T) -> Result<Self> {
        Ok(CacheValue::Object(PackedObject::pack(value)?))
    }

    // == From JSON ==
    /// Maps a decoded JSON document back onto the value model.
    ///
    /// Scalar JSON values become scalar variants; arrays and maps stay as
    /// [`CacheValue::Json`].
    pub(crate) fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => CacheValue::Null,
            JsonValue::Bool(b) => CacheValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => CacheValue::Int(i),
                None => CacheValue::Float(n.as_f64().unwrap_or(0.0)),
            },
            JsonValue::String(s) => CacheValue::Text(s),
            composite @ (JsonValue::Array(_) | JsonValue::Object(_)) => CacheValue::Json(composite),
        }
    }

    // == Is Empty ==
    /// Returns true for values indistinguishable from "no value" under the
    /// default-substitution policy: null, false, zero, empty text, empty
    /// sequences and empty mappings.
    ///
    /// Packed objects are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CacheValue::Null => true,
            CacheValue::Bool(b) => !b,
            CacheValue::Int(i) => *i == 0,
            CacheValue::Float(f) => *f == 0.0,
            CacheValue::Text(s) => s.is_empty(),
            CacheValue::Json(json) => json_is_empty(json),
            CacheValue::Object(_) => false,
        }
    }

    // == Accessors ==
    /// Returns the text content, if this is a text scalar.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CacheValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer scalar.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CacheValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the packed object, if this is an object value.
    pub fn as_object(&self) -> Option<&PackedObject> {
        match self {
            CacheValue::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// Emptiness rules for raw JSON documents, matching the scalar rules above.
fn json_is_empty(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(entries) => entries.is_empty(),
    }
}

// == Conversions ==
impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        CacheValue::Text(s.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(s: String) -> Self {
        CacheValue::Text(s)
    }
}

impl From<i64> for CacheValue {
    fn from(i: i64) -> Self {
        CacheValue::Int(i)
    }
}

impl From<f64> for CacheValue {
    fn from(f: f64) -> Self {
        CacheValue::Float(f)
    }
}

impl From<bool> for CacheValue {
    fn from(b: bool) -> Self {
        CacheValue::Bool(b)
    }
}

impl From<JsonValue> for CacheValue {
    fn from(value: JsonValue) -> Self {
        CacheValue::Json(value)
    }
}

impl From<PackedObject> for CacheValue {
    fn from(obj: PackedObject) -> Self {
        CacheValue::Object(obj)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user_id: u64,
        token: String,
    }

    impl Packable for Session {
        const TAG: &'static str = "session";
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
    }

    impl Packable for Profile {
        const TAG: &'static str = "profile";
    }

    fn sample_session() -> Session {
        Session {
            user_id: 7,
            token: "abc".to_string(),
        }
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        let packed = PackedObject::pack(&sample_session()).unwrap();
        assert_eq!(packed.tag(), "session");
        assert_eq!(packed.unpack::<Session>().unwrap(), sample_session());
    }

    #[test]
    fn test_unpack_wrong_tag() {
        let packed = PackedObject::pack(&sample_session()).unwrap();
        assert!(packed.unpack::<Profile>().is_none());
    }

    #[test]
    fn test_unpack_wrong_shape() {
        let packed = PackedObject::from_parts("session".to_string(), json!({"nope": true}));
        assert!(packed.unpack::<Session>().is_none());
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(CacheValue::from_json(json!(null)), CacheValue::Null);
        assert_eq!(CacheValue::from_json(json!(true)), CacheValue::Bool(true));
        assert_eq!(CacheValue::from_json(json!(42)), CacheValue::Int(42));
        assert_eq!(CacheValue::from_json(json!(1.5)), CacheValue::Float(1.5));
        assert_eq!(
            CacheValue::from_json(json!("hi")),
            CacheValue::Text("hi".to_string())
        );
    }

    #[test]
    fn test_from_json_keeps_composites() {
        assert_eq!(
            CacheValue::from_json(json!([1, 2])),
            CacheValue::Json(json!([1, 2]))
        );
        assert_eq!(
            CacheValue::from_json(json!({"a": 1})),
            CacheValue::Json(json!({"a": 1}))
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(CacheValue::Null.is_empty());
        assert!(CacheValue::Bool(false).is_empty());
        assert!(CacheValue::Int(0).is_empty());
        assert!(CacheValue::Float(0.0).is_empty());
        assert!(CacheValue::Text(String::new()).is_empty());
        assert!(CacheValue::Json(json!([])).is_empty());
        assert!(CacheValue::Json(json!({})).is_empty());

        assert!(!CacheValue::Bool(true).is_empty());
        assert!(!CacheValue::Int(1).is_empty());
        assert!(!CacheValue::Text("x".to_string()).is_empty());
        assert!(!CacheValue::Json(json!([0])).is_empty());

        let packed = PackedObject::pack(&sample_session()).unwrap();
        assert!(!CacheValue::Object(packed).is_empty());
    }
}
