//! Compiles the code generated from `fixtures/protocol.json` next to the
//! hand-authored core types it depends on, and exercises its codecs.
pub use metamodel_codegen::runtime::{
    DecodeError, JsonCodec, decode_array, integer_value, optional_field, required_field,
};
pub use serde_json::{Map, Value};

/// Excluded from generation by default; the escape type stands in for it.
pub type LSPAny = Value;

/// Excluded from generation by `build.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: i64,
    pub character: i64,
}

impl JsonCodec for Position {
    fn to_json(&self) -> Value {
        serde_json::json!({ "line": self.line, "character": self.character })
    }

    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let object = value.as_object().ok_or(DecodeError::ExpectedObject)?;
        let number = |key: &str| -> Result<i64, DecodeError> {
            required_field(object, key)?.as_i64().ok_or(DecodeError::ExpectedNumber)
        };
        Ok(Self { line: number("line")?, character: number("character")? })
    }
}

include!(concat!(env!("OUT_DIR"), "/protocol.rs"));
