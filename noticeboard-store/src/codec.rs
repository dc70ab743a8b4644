//! Persisted collection format: a bare JSON array of announcement records.

use serde_json::Value;

use noticeboard_core::error::{BoardError, Result};
use noticeboard_core::types::Announcement;

/// Decodes a stored collection.
///
/// A value that is valid JSON but not an array is reported as
/// `CorruptCollection` rather than read as empty.
pub(crate) fn decode_collection(raw: &str) -> Result<Vec<Announcement>> {
    let value: Value = serde_json::from_str(raw)?;
    decode_value(value)
}

/// Decodes an already-parsed stored collection.
pub(crate) fn decode_value(value: Value) -> Result<Vec<Announcement>> {
    match value {
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| BoardError::CorruptCollection(format!("invalid announcement record: {e}"))),
        other => Err(BoardError::CorruptCollection(format!(
            "expected a list of announcements, found {}",
            kind_of(&other)
        ))),
    }
}

/// Encodes a collection with two-space indentation.
pub(crate) fn encode_collection(announcements: &[Announcement]) -> Result<String> {
    Ok(serde_json::to_string_pretty(announcements)?)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
