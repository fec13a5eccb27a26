//! Decoding of the raw request body into a loosely-typed field map.

use serde_json::{Map, Value};
use thiserror::Error;

/// Failures raised before any field is looked at.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Request body is empty")]
    EmptyBody,
    #[error("Invalid request body type")]
    NotText(#[source] std::str::Utf8Error),
    #[error("Invalid JSON payload: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Invalid JSON payload: expected an object")]
    NotAnObject,
}

/// Untyped key/value view of a request body, alive for one validation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload(Map<String, Value>);

impl RawPayload {
    /// Decode a request body that must hold a JSON object.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        if body.is_empty() {
            return Err(DecodeError::EmptyBody);
        }

        let text = std::str::from_utf8(body).map_err(DecodeError::NotText)?;
        match serde_json::from_str::<Value>(text).map_err(DecodeError::Malformed)? {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(DecodeError::NotAnObject),
        }
    }

    /// Look up a field; `None` when the key is absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl From<Map<String, Value>> for RawPayload {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
