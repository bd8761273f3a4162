//! Request/response codec for the tunnel-control protocol.
//!
//! Requests are a self-describing JSON envelope:
//!
//! ```json
//! {"method": "changeProxy", "args": {"selectorName": "auto", "proxyName": "hk-01"}}
//! ```
//!
//! Argument values are null, boolean, integer, or string; nothing nested.
//! Replies are raw payload bytes whose interpretation is fixed by the call
//! site, not by anything in the payload itself — caller and control process
//! agree per method:
//!
//! - `Void` — no payload expected; anything present is ignored
//! - `Bool` — exactly 1 byte, nonzero means true
//! - `Int` — exactly 8 bytes, little-endian `i64`
//! - `Text` — UTF-8 bytes
//!
//! The fixed integer width keeps the wire contract identical across
//! platforms; the control process must not reply with its native word size.

use crate::error::codec::CodecError;

use common::ErrorLocation;

use serde::Serialize;

/// Flat key→value argument map sent with a request.
pub type ArgMap = serde_json::Map<String, serde_json::Value>;

/// Byte length of a `Bool`-shaped reply payload.
pub const BOOL_PAYLOAD_BYTES: usize = 1;

/// Byte length of an `Int`-shaped reply payload (little-endian `i64`).
pub const INT_PAYLOAD_BYTES: usize = 8;

/// Reply interpretation declared by the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Void,
    Bool,
    Int,
    Text,
}

/// A decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedResult {
    Void,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl TypedResult {
    /// Extract the boolean value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] if the result is any other variant.
    pub fn into_bool(self) -> Result<bool, CodecError> {
        match self {
            TypedResult::Bool(value) => Ok(value),
            other => Err(shape_mismatch("bool", &other)),
        }
    }

    /// Extract the integer value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] if the result is any other variant.
    pub fn into_int(self) -> Result<i64, CodecError> {
        match self {
            TypedResult::Int(value) => Ok(value),
            other => Err(shape_mismatch("int", &other)),
        }
    }

    /// Extract the text value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] if the result is any other variant.
    pub fn into_text(self) -> Result<String, CodecError> {
        match self {
            TypedResult::Text(value) => Ok(value),
            other => Err(shape_mismatch("text", &other)),
        }
    }
}

#[track_caller]
fn shape_mismatch(expected: &str, got: &TypedResult) -> CodecError {
    CodecError::Malformed {
        message: format!("expected {expected} result, decoded {got:?}"),
        location: ErrorLocation::capture(),
    }
}

#[derive(Serialize)]
struct RequestEnvelope<'a> {
    method: &'a str,
    args: &'a ArgMap,
}

/// Encode one request envelope.
///
/// An empty `args` map serializes as `{}`, never as `null` — the control
/// process treats a missing args object as a protocol violation.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_request(method: &str, args: &ArgMap) -> Result<Vec<u8>, CodecError> {
    let envelope = RequestEnvelope { method, args };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decode a raw reply payload according to the shape the call site expects.
///
/// `None` means the control process replied without a payload, which is
/// valid only for `Void`-shaped calls. `Some(&[])` is a present-but-empty
/// payload and is *not* the same thing: it fails every non-`Void` shape by
/// length and is ignored by `Void` like any other payload.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] when the payload is absent for a
/// non-`Void` shape, has the wrong length for `Bool`/`Int`, or is not valid
/// UTF-8 for `Text`.
pub fn decode_response(
    payload: Option<&[u8]>,
    shape: ResultShape,
) -> Result<TypedResult, CodecError> {
    match shape {
        // Whatever the control process sent back, a void call never
        // interprets it.
        ResultShape::Void => Ok(TypedResult::Void),
        ResultShape::Bool => {
            let bytes = require_payload(payload, shape)?;
            if bytes.len() != BOOL_PAYLOAD_BYTES {
                return Err(CodecError::Malformed {
                    message: format!(
                        "bool reply must be {BOOL_PAYLOAD_BYTES} byte, got {}",
                        bytes.len()
                    ),
                    location: ErrorLocation::capture(),
                });
            }
            Ok(TypedResult::Bool(bytes[0] != 0))
        }
        ResultShape::Int => {
            let bytes = require_payload(payload, shape)?;
            let words: [u8; INT_PAYLOAD_BYTES] =
                bytes.try_into().map_err(|_| CodecError::Malformed {
                    message: format!(
                        "int reply must be {INT_PAYLOAD_BYTES} bytes, got {}",
                        bytes.len()
                    ),
                    location: ErrorLocation::capture(),
                })?;
            Ok(TypedResult::Int(i64::from_le_bytes(words)))
        }
        ResultShape::Text => {
            let bytes = require_payload(payload, shape)?;
            let text = String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::Malformed {
                message: format!("text reply is not valid UTF-8: {e}"),
                location: ErrorLocation::capture(),
            })?;
            Ok(TypedResult::Text(text))
        }
    }
}

#[track_caller]
fn require_payload(payload: Option<&[u8]>, shape: ResultShape) -> Result<&[u8], CodecError> {
    payload.ok_or_else(|| CodecError::Malformed {
        message: format!("reply payload absent for {shape:?}-shaped call"),
        location: ErrorLocation::capture(),
    })
}
