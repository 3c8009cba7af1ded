//! Transport header codec.
//!
//! A proof travels as `base64(utf8(canonical_json(proof)))` in the
//! `X-Causal-Proof` header, with `X-Causal-Proof-Schema: causal-v1`
//! alongside. Decoding re-validates the parsed value against the proof shape
//! before typed deserialization, so a malformed header is one hard
//! decode failure rather than a half-parsed proof.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

use crate::causal::event::ActionType;
use crate::types::CausalProof;

/// Header carrying the encoded proof.
pub const PROOF_HEADER: &str = "X-Causal-Proof";

/// Header naming the proof schema.
pub const SCHEMA_HEADER: &str = "X-Causal-Proof-Schema";

/// Current schema identifier.
pub const SCHEMA_VERSION: &str = "causal-v1";

/// Codec failures. Malformed base64, malformed JSON, and schema mismatches
/// all surface as a single decode-failed condition.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode causal proof header: {0}")]
    EncodeFailed(String),

    #[error("failed to decode causal proof header: {0}")]
    DecodeFailed(String),
}

/// Encode a proof as `base64(utf8(canonical_json(proof)))`.
pub fn encode(proof: &CausalProof) -> Result<String, CodecError> {
    let canonical = serde_json_canonicalizer::to_string(proof)
        .map_err(|err| CodecError::EncodeFailed(err.to_string()))?;
    Ok(BASE64.encode(canonical.as_bytes()))
}

/// Decode and schema-check a header value back into a proof.
pub fn decode(text: &str) -> Result<CausalProof, CodecError> {
    let bytes = BASE64
        .decode(text.trim())
        .map_err(|err| CodecError::DecodeFailed(format!("malformed base64: {err}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|err| CodecError::DecodeFailed(format!("malformed JSON: {err}")))?;
    validate_shape(&value)?;
    serde_json::from_value(value)
        .map_err(|err| CodecError::DecodeFailed(format!("schema mismatch: {err}")))
}

/// Both transport headers for a proof, ready to attach to a request.
pub fn headers(proof: &CausalProof) -> Result<[(&'static str, String); 2], CodecError> {
    Ok([
        (PROOF_HEADER, encode(proof)?),
        (SCHEMA_HEADER, SCHEMA_VERSION.to_owned()),
    ])
}

fn validate_shape(value: &Value) -> Result<(), CodecError> {
    let root = require_object(value, "proof")?;

    let target = require_object(require_field(root, "targetEvent")?, "targetEvent")?;
    require_string(target, "targetEvent.causalEventId", "causalEventId")?;
    require_string(target, "targetEvent.agentId", "agentId")?;
    require_action_type(target, "targetEvent.actionType", "actionType")?;
    require_string(target, "targetEvent.payloadHash", "payloadHash")?;
    require_nullable_string(target, "targetEvent.predecessorHash", "predecessorHash")?;
    require_integer(target, "targetEvent.timestamp", "timestamp")?;
    require_string(target, "targetEvent.eventHash", "eventHash")?;
    require_unsigned(target, "targetEvent.positionInTree", "positionInTree")?;
    require_string(target, "targetEvent.treeRootHash", "treeRootHash")?;

    let path = require_array(require_field(root, "proofPath")?, "proofPath")?;
    for (index, entry) in path.iter().enumerate() {
        let step = require_object(entry, &format!("proofPath[{index}]"))?;
        require_string(step, &format!("proofPath[{index}].eventHash"), "eventHash")?;
        require_string(step, &format!("proofPath[{index}].siblingHash"), "siblingHash")?;
        let position = require_string(step, &format!("proofPath[{index}].position"), "position")?;
        if position != "left" && position != "right" {
            return Err(schema_error(format!(
                "proofPath[{index}].position must be \"left\" or \"right\""
            )));
        }
    }

    let chain = require_array(require_field(root, "causalChain")?, "causalChain")?;
    for (index, entry) in chain.iter().enumerate() {
        let link = require_object(entry, &format!("causalChain[{index}]"))?;
        require_string(link, &format!("causalChain[{index}].eventHash"), "eventHash")?;
        require_action_type(link, &format!("causalChain[{index}].actionType"), "actionType")?;
        require_integer(link, &format!("causalChain[{index}].timestamp"), "timestamp")?;
        require_nullable_string(
            link,
            &format!("causalChain[{index}].predecessorHash"),
            "predecessorHash",
        )?;
    }

    require_string(root, "treeRootHash", "treeRootHash")?;
    require_string(root, "agentSignature", "agentSignature")?;
    Ok(())
}

fn schema_error(detail: impl Into<String>) -> CodecError {
    CodecError::DecodeFailed(format!("schema mismatch: {}", detail.into()))
}

fn require_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a serde_json::Map<String, Value>, CodecError> {
    value
        .as_object()
        .ok_or_else(|| schema_error(format!("{path} must be an object")))
}

fn require_field<'a>(
    object: &'a serde_json::Map<String, Value>,
    field: &str,
) -> Result<&'a Value, CodecError> {
    object
        .get(field)
        .ok_or_else(|| schema_error(format!("missing field {field}")))
}

fn require_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, CodecError> {
    value
        .as_array()
        .ok_or_else(|| schema_error(format!("{path} must be an array")))
}

fn require_string<'a>(
    object: &'a serde_json::Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<&'a str, CodecError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| schema_error(format!("{path} must be a string")))
}

fn require_nullable_string(
    object: &serde_json::Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<(), CodecError> {
    match object.get(field) {
        Some(Value::String(_)) | Some(Value::Null) | None => Ok(()),
        Some(_) => Err(schema_error(format!("{path} must be a string or null"))),
    }
}

fn require_integer(
    object: &serde_json::Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<(), CodecError> {
    match object.get(field) {
        Some(value) if value.as_i64().is_some() => Ok(()),
        _ => Err(schema_error(format!("{path} must be an integer"))),
    }
}

fn require_unsigned(
    object: &serde_json::Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<(), CodecError> {
    match object.get(field) {
        Some(value) if value.as_u64().is_some() => Ok(()),
        _ => Err(schema_error(format!(
            "{path} must be a non-negative integer"
        ))),
    }
}

fn require_action_type(
    object: &serde_json::Map<String, Value>,
    path: &str,
    field: &str,
) -> Result<(), CodecError> {
    let name = require_string(object, path, field)?;
    name.parse::<ActionType>()
        .map(|_| ())
        .map_err(|_| schema_error(format!("{path} names no known action type: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::causal::event::CausalEvent;
    use crate::crypto::hash::sha3;
    use crate::types::Digest;

    fn sample_proof() -> CausalProof {
        let payload = sha3(b"payload");
        let event_hash = sha3(b"event");
        CausalProof {
            target_event: CausalEvent {
                causal_event_id: "017f22e2-79b0-7cc3-98c2-2b59e3a2f3a1".into(),
                agent_id: "0xA".into(),
                action_type: ActionType::Request,
                payload_hash: payload,
                predecessor_hash: None,
                timestamp: 1_000,
                event_hash: event_hash.clone(),
                position_in_tree: 0,
                tree_root_hash: event_hash.clone(),
            },
            proof_path: Vec::new(),
            causal_chain: vec![crate::types::ChainLink {
                event_hash: event_hash.clone(),
                action_type: ActionType::Request,
                timestamp: 1_000,
                predecessor_hash: None,
            }],
            tree_root_hash: event_hash,
            agent_signature: format!("0x{}", "ab".repeat(64)),
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let proof = sample_proof();
        let encoded = encode(&proof).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, proof);
    }

    #[test]
    fn test_encoded_form_is_canonical_json() {
        let encoded = encode(&sample_proof()).unwrap();
        let bytes = BASE64.decode(&encoded).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        // Canonical JSON sorts keys and strips whitespace.
        assert!(text.starts_with("{\"agentSignature\""));
        assert!(!text.contains(' '));
    }

    #[test]
    fn test_malformed_base64_rejected() {
        let err = decode("%%% not base64 %%%").unwrap_err();
        assert!(err.to_string().contains("malformed base64"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = decode(&BASE64.encode(b"{ not json")).unwrap_err();
        assert!(err.to_string().contains("malformed JSON"));
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut value = serde_json::to_value(sample_proof()).unwrap();
        value.as_object_mut().unwrap().remove("agentSignature");
        let err = decode(&BASE64.encode(value.to_string())).unwrap_err();
        assert!(err.to_string().contains("agentSignature must be a string"));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut value = serde_json::to_value(sample_proof()).unwrap();
        value["targetEvent"]["timestamp"] = Value::String("soon".into());
        let err = decode(&BASE64.encode(value.to_string())).unwrap_err();
        assert!(err.to_string().contains("timestamp must be an integer"));
    }

    #[test]
    fn test_unknown_action_type_rejected() {
        let mut value = serde_json::to_value(sample_proof()).unwrap();
        value["targetEvent"]["actionType"] = Value::String("transfer".into());
        let err = decode(&BASE64.encode(value.to_string())).unwrap_err();
        assert!(err.to_string().contains("names no known action type"));
    }

    #[test]
    fn test_negative_position_rejected() {
        let mut value = serde_json::to_value(sample_proof()).unwrap();
        value["targetEvent"]["positionInTree"] = Value::from(-1);
        let err = decode(&BASE64.encode(value.to_string())).unwrap_err();
        assert!(err.to_string().contains("non-negative integer"));
    }

    #[test]
    fn test_bad_sibling_position_rejected() {
        let mut value = serde_json::to_value(sample_proof()).unwrap();
        value["proofPath"] = serde_json::json!([{
            "eventHash": "0xaa",
            "siblingHash": "0xbb",
            "position": "up"
        }]);
        let err = decode(&BASE64.encode(value.to_string())).unwrap_err();
        assert!(err.to_string().contains("\"left\" or \"right\""));
    }

    #[test]
    fn test_headers_pair() {
        let pairs = headers(&sample_proof()).unwrap();
        assert_eq!(pairs[0].0, PROOF_HEADER);
        assert_eq!(pairs[1], (SCHEMA_HEADER, SCHEMA_VERSION.to_owned()));
        assert!(decode(&pairs[0].1).is_ok());
    }

    #[test]
    fn test_predecessor_states_survive_roundtrip() {
        let absent = sample_proof();
        let decoded = decode(&encode(&absent).unwrap()).unwrap();
        assert_eq!(decoded.target_event.predecessor_hash, None);

        let mut linked = sample_proof();
        linked.target_event.predecessor_hash = Some(Digest::new(format!("0x{}", "cd".repeat(32))));
        let decoded = decode(&encode(&linked).unwrap()).unwrap();
        assert_eq!(
            decoded.target_event.predecessor_hash,
            linked.target_event.predecessor_hash
        );
    }
}
