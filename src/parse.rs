//! Standard response parsers
//!
//! The two JSON conveniences most callers need, as plain functions matching
//! the parser contract. Anything else goes through a custom parser supplied
//! to an object request.

use crate::error::BoxError;
use crate::types::{JsonObject, JsonValue};
use bytes::Bytes;

/// Parse response bytes as a JSON array.
pub fn json_array(body: &Bytes) -> Result<Vec<JsonValue>, BoxError> {
    match serde_json::from_slice(body)? {
        JsonValue::Array(values) => Ok(values),
        other => Err(format!("expected a JSON array, got {}", kind_of(&other)).into()),
    }
}

/// Parse response bytes as a JSON object.
pub fn json_object(body: &Bytes) -> Result<JsonObject, BoxError> {
    match serde_json::from_slice(body)? {
        JsonValue::Object(object) => Ok(object),
        other => Err(format!("expected a JSON object, got {}", kind_of(&other)).into()),
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
