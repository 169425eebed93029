//! Response payload handling: entity envelopes and error flattening.
//!
//! Error bodies come in two shapes, `{message}` and `{errors:[{field?, message}]}`.
//! The UI only ever needs one display string, so both are flattened here.

use crate::errors::{FieldError, Result, flatten_field_errors};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorItem {
    Field(FieldError),
    Text(String),
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
    #[serde(default)]
    error: Option<String>,
}

/// Flattens a decoded error payload into one line, `None` when it carries no message.
#[must_use]
pub fn flatten_error_payload(value: &Value) -> Option<String> {
    let payload = ErrorPayload::deserialize(value).ok()?;

    let field_errors: Vec<FieldError> = payload
        .errors
        .into_iter()
        .map(|item| match item {
            ErrorItem::Field(error) => error,
            ErrorItem::Text(message) => FieldError::form(message),
        })
        .filter(|error| !error.message.trim().is_empty())
        .collect();
    if !field_errors.is_empty() {
        return Some(flatten_field_errors(&field_errors));
    }

    [payload.message, payload.error]
        .into_iter()
        .flatten()
        .find(|message| !message.trim().is_empty())
}

/// Flattens a raw error response body; falls back to naming the status.
#[must_use]
pub fn flatten_error_body(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| flatten_error_payload(&value))
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

/// Decodes a single entity that may be wrapped as `{data: {...}}`.
pub fn decode_entity<T: DeserializeOwned>(value: &Value) -> Result<T> {
    match value.get("data") {
        Some(inner) if inner.is_object() || inner.is_array() => {
            T::deserialize(inner).map_err(Into::into)
        }
        _ => T::deserialize(value).map_err(Into::into),
    }
}
