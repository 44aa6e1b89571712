//! Support library the generated code links against.
//!
//! Generated files expect `Map`, `Value`, [`JsonCodec`], [`DecodeError`] and
//! the helpers below to be in scope at the `include!` site.
use serde_json::{Map, Value};

/// Closed taxonomy of failures raised by generated decoders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected object")]
    ExpectedObject,
    #[error("expected string")]
    ExpectedString,
    #[error("expected number")]
    ExpectedNumber,
    #[error("expected boolean")]
    ExpectedBoolean,
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("invalid enum value")]
    InvalidEnumValue,
}

/// Paired JSON codec implemented by every generated enumeration and structure.
pub trait JsonCodec: Sized {
    /// Total; never fails.
    fn to_json(&self) -> Value;
    fn from_json(value: &Value) -> Result<Self, DecodeError>;
}

/// The opaque escape type: identity in both directions.
impl JsonCodec for Value {
    fn to_json(&self) -> Value {
        self.clone()
    }

    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

/// Value under `key`, or `MissingField`.
pub fn required_field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value, DecodeError> {
    object
        .get(key)
        .ok_or_else(|| DecodeError::MissingField(key.to_string()))
}

/// Value under `key`; a missing key and an explicit `null` are both absent.
pub fn optional_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

/// Integer view of a JSON number: exact when it fits `i64`, otherwise the
/// float value truncated.
pub fn integer_value(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|number| number as i64))
}

/// Lenient array decoding: anything but a JSON array decodes to an empty `Vec`.
///
/// Element errors still propagate; element leniency, where wanted, lives in
/// the `decode` callback.
pub fn decode_array<T, F>(value: &Value, decode: F) -> Result<Vec<T>, DecodeError>
where
    F: FnMut(&Value) -> Result<T, DecodeError>,
{
    match value.as_array() {
        Some(items) => items.iter().map(decode).collect(),
        None => Ok(Vec::new()),
    }
}
