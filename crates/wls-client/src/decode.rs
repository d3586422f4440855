//! JSON decoding of search responses.
//!
//! The response schema belongs to the remote service, so the default decoder
//! returns a generic [`serde_json::Value`]. Callers that know the shape can use
//! [`decode_as`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// Decode a response body into a generic JSON value.
///
/// # Errors
///
/// Returns [`ClientError::DecodeError`] if the body is not valid JSON.
pub fn decode(body: &[u8]) -> Result<Value, ClientError> {
    decode_as(body)
}

/// Decode a response body into `T`.
///
/// # Errors
///
/// Returns [`ClientError::DecodeError`] if the body is not valid JSON or does
/// not match `T`.
pub fn decode_as<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    Ok(serde_json::from_slice(body)?)
}
