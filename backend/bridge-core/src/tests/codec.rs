// Unit tests for the request/response codec.
// Wire-level behavior is pinned here; the RPC client tests only cover how
// codec errors surface through invoke.

use crate::codec::{
    ArgMap, BOOL_PAYLOAD_BYTES, INT_PAYLOAD_BYTES, ResultShape, TypedResult, decode_response,
    encode_request,
};
use crate::error::codec::CodecError;

use serde_json::{Value, json};

/// **VALUE**: Verifies the bool decode contract: exactly one byte, any
/// nonzero value reads as true.
///
/// **WHY THIS MATTERS**: The control process writes its native bool as a
/// single byte; some cores emit values other than 0/1. Mapping by `!= 0`
/// instead of `== 1` is the agreed contract.
///
/// **BUG THIS CATCHES**: An equality check against 1 would silently turn a
/// truthy reply into `false`, masking a live connection as dead.
#[test]
fn given_single_byte_payloads_when_decode_bool_then_nonzero_is_true() {
    assert_eq!(
        decode_response(Some(&[1]), ResultShape::Bool).expect("decode [1]"),
        TypedResult::Bool(true)
    );
    assert_eq!(
        decode_response(Some(&[0]), ResultShape::Bool).expect("decode [0]"),
        TypedResult::Bool(false)
    );
    assert_eq!(
        decode_response(Some(&[7]), ResultShape::Bool).expect("decode [7]"),
        TypedResult::Bool(true)
    );
}

/// **VALUE**: Verifies bool length enforcement, including the
/// present-but-empty payload.
///
/// **WHY THIS MATTERS**: A present-but-empty payload is a different wire
/// fact than an absent one; both must fail a Bool-shaped call, and a
/// two-byte payload means caller and process disagree about the method's
/// shape.
///
/// **BUG THIS CATCHES**: Indexing byte 0 without a length check would panic
/// on an empty payload or silently accept oversized garbage.
#[test]
fn given_wrong_length_when_decode_bool_then_malformed() {
    // GIVEN/WHEN: payloads of every length except BOOL_PAYLOAD_BYTES
    for payload in [&[][..], &[1, 0][..], &[0; 8][..]] {
        let result = decode_response(Some(payload), ResultShape::Bool);

        // THEN: decode must refuse
        assert!(
            matches!(result, Err(CodecError::Malformed { .. })),
            "len {} should be malformed",
            payload.len()
        );
    }
    assert_eq!(BOOL_PAYLOAD_BYTES, 1);
}

#[test]
fn given_absent_payload_when_decode_bool_then_malformed() {
    let result = decode_response(None, ResultShape::Bool);
    assert!(matches!(result, Err(CodecError::Malformed { .. })));
}

/// **VALUE**: Verifies the fixed-width little-endian int decode for a
/// positive, a negative, and a zero value.
///
/// **WHY THIS MATTERS**: The wire contract is a declared 8-byte
/// little-endian i64, not the host's pointer width. Negative status codes
/// are how the control process reports failures, so sign handling matters.
///
/// **BUG THIS CATCHES**: Decoding as unsigned, wrong endianness, or a
/// 4-byte read would corrupt every status code the UI displays.
#[test]
fn given_le_encoded_values_when_decode_int_then_value_roundtrips() {
    for expected in [4242_i64, -7, 0, i64::MIN, i64::MAX] {
        let payload = expected.to_le_bytes();
        assert_eq!(
            decode_response(Some(&payload), ResultShape::Int).expect("decode int"),
            TypedResult::Int(expected)
        );
    }
}

#[test]
fn given_wrong_length_when_decode_int_then_malformed() {
    for payload in [&[][..], &[0; 7][..], &[0; 9][..], &[1][..]] {
        let result = decode_response(Some(payload), ResultShape::Int);
        assert!(
            matches!(result, Err(CodecError::Malformed { .. })),
            "len {} should be malformed",
            payload.len()
        );
    }
    assert!(matches!(
        decode_response(None, ResultShape::Int),
        Err(CodecError::Malformed { .. })
    ));
    assert_eq!(INT_PAYLOAD_BYTES, 8);
}

/// **VALUE**: Verifies text decode returns the identical string and that an
/// empty-but-present payload is a valid empty string.
///
/// **WHY THIS MATTERS**: Proxy names and config dumps routinely contain
/// multi-byte UTF-8; any lossy conversion would corrupt them.
///
/// **BUG THIS CATCHES**: A `from_utf8_lossy` fallback would smuggle
/// replacement characters into config JSON instead of failing loudly.
#[test]
fn given_utf8_payload_when_decode_text_then_identical_string() {
    let text = "proxies: 香港-01 ✓";
    assert_eq!(
        decode_response(Some(text.as_bytes()), ResultShape::Text).expect("decode text"),
        TypedResult::Text(text.to_string())
    );

    assert_eq!(
        decode_response(Some(&[]), ResultShape::Text).expect("decode empty"),
        TypedResult::Text(String::new())
    );
}

#[test]
fn given_invalid_utf8_when_decode_text_then_malformed() {
    // 0xFF can never begin a UTF-8 sequence
    let result = decode_response(Some(&[0xFF, 0xFE, b'a']), ResultShape::Text);
    assert!(matches!(result, Err(CodecError::Malformed { .. })));

    assert!(matches!(
        decode_response(None, ResultShape::Text),
        Err(CodecError::Malformed { .. })
    ));
}

/// **VALUE**: Verifies void-shaped calls never interpret reply bytes, even
/// when the control process wrongly sends some.
///
/// **WHY THIS MATTERS**: Several void methods on older cores echo debug
/// bytes back. The contract says a void call site ignores the payload
/// rather than failing the whole call over bytes it never asked for.
///
/// **BUG THIS CATCHES**: Treating an unexpected payload as malformed would
/// turn every `closeAllConnections` against such a core into an error.
#[test]
fn given_void_shape_when_payload_present_then_ignored() {
    assert_eq!(
        decode_response(Some(&[0xde, 0xad]), ResultShape::Void).expect("decode void"),
        TypedResult::Void
    );
    assert_eq!(
        decode_response(None, ResultShape::Void).expect("decode absent void"),
        TypedResult::Void
    );
}

/// **VALUE**: Verifies the request envelope is self-describing JSON with
/// the method name and a flat args object, null values included.
///
/// **WHY THIS MATTERS**: The control process dispatches on `method` and
/// reads parameters by exact key; the envelope shape is the entire request
/// wire contract.
///
/// **BUG THIS CATCHES**: Renamed fields, nested args, or dropped null
/// values would make every request undecodable on the other side.
#[test]
fn given_method_and_args_when_encode_then_self_describing_envelope() {
    // GIVEN: a mixed-type argument map
    let mut args = ArgMap::new();
    args.insert("proxyName".to_string(), json!("hk-01"));
    args.insert("timeout".to_string(), json!(5000));
    args.insert("marker".to_string(), Value::Null);

    // WHEN: encoded and parsed back
    let payload = encode_request("asyncTestDelay", &args).expect("encode");
    let parsed: Value = serde_json::from_slice(&payload).expect("envelope is JSON");

    // THEN: envelope carries the method and the exact args
    assert_eq!(parsed["method"], json!("asyncTestDelay"));
    assert_eq!(parsed["args"]["proxyName"], json!("hk-01"));
    assert_eq!(parsed["args"]["timeout"], json!(5000));
    assert_eq!(parsed["args"]["marker"], Value::Null);
}

#[test]
fn given_empty_args_when_encode_then_empty_object_not_null() {
    let payload = encode_request("getProxies", &ArgMap::new()).expect("encode");
    let parsed: Value = serde_json::from_slice(&payload).expect("envelope is JSON");
    assert_eq!(parsed["args"], json!({}));
}

#[test]
fn given_mismatched_variant_when_accessor_called_then_malformed() {
    let result = TypedResult::Text("not an int".to_string()).into_int();
    assert!(matches!(result, Err(CodecError::Malformed { .. })));

    let result = TypedResult::Int(1).into_bool();
    assert!(matches!(result, Err(CodecError::Malformed { .. })));

    let result = TypedResult::Void.into_text();
    assert!(matches!(result, Err(CodecError::Malformed { .. })));
}
