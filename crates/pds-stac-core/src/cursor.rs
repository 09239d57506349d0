//! Opaque pagination tokens.
//!
//! A token is the URL-safe, unpadded base64 form of the JSON array of sort
//! values of the last hit a page returned. The index resumes from it with
//! `search_after`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;

use crate::error::AppError;

/// Encodes sort values into a token.
///
/// # Examples
///
/// ```
/// use pds_stac_core::cursor;
/// use serde_json::json;
///
/// let values = vec![json!("2024-01-01T00:00:00Z"), json!(42)];
/// let token = cursor::encode(&values);
/// assert!(!token.contains('='));
/// assert_eq!(cursor::decode(&token).unwrap(), values);
/// ```
pub fn encode(sort_values: &[Value]) -> String {
    // Serializing a slice of `Value` cannot fail.
    let json = Value::Array(sort_values.to_vec()).to_string();
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decodes a token back into the sort values it was built from.
///
/// # Errors
///
/// Returns `AppError::InvalidCursor` if the token is not base64, not JSON,
/// or not a JSON array.
pub fn decode(token: &str) -> Result<Vec<Value>, AppError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| AppError::InvalidCursor(format!("not base64: {}", e)))?;

    match serde_json::from_slice(&bytes) {
        Ok(Value::Array(values)) => Ok(values),
        Ok(other) => Err(AppError::InvalidCursor(format!(
            "expected a JSON array, got {}",
            other
        ))),
        Err(e) => Err(AppError::InvalidCursor(format!("not JSON: {}", e))),
    }
}
