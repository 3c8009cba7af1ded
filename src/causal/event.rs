//! Causal events: what an agent did, bound to its predecessor by digest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::hash::{sha3_concat, HashPart};
use crate::types::Digest;

/// The closed set of loggable actions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Request,
    Response,
    Error,
    StateTransition,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        ActionType::Request,
        ActionType::Response,
        ActionType::Error,
        ActionType::StateTransition,
    ];

    /// Canonical name as it enters the event digest.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Request => "request",
            ActionType::Response => "response",
            ActionType::Error => "error",
            ActionType::StateTransition => "state_transition",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no member of the closed action set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid action type: {0}")]
pub struct InvalidActionType(pub String);

impl FromStr for ActionType {
    type Err = InvalidActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| InvalidActionType(s.to_owned()))
    }
}

/// What a caller submits to the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub agent_id: String,
    pub action_type: ActionType,
    /// Digest of the action payload; plaintext never enters the log.
    pub payload_hash: Digest,
    /// Digest of the causally preceding event. An absent predecessor is a
    /// branch marker and is allowed at any point in the log, not just for
    /// the first event.
    pub predecessor_hash: Option<Digest>,
    /// Client-supplied Unix ms, untrusted.
    pub timestamp: i64,
}

/// A registered event: the input augmented with its identity and its position
/// in the commitment log. Immutable once returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalEvent {
    pub causal_event_id: String,
    pub agent_id: String,
    pub action_type: ActionType,
    pub payload_hash: Digest,
    pub predecessor_hash: Option<Digest>,
    pub timestamp: i64,
    /// SHA3-256 of the canonical field encoding.
    pub event_hash: Digest,
    /// 0-based leaf index at insertion time.
    pub position_in_tree: usize,
    /// Log root immediately after this event's insertion.
    pub tree_root_hash: Digest,
}

impl CausalEvent {
    /// Recompute the canonical digest from this event's content fields.
    pub fn content_digest(&self) -> Digest {
        event_digest(
            &self.agent_id,
            self.action_type,
            &self.payload_hash,
            self.predecessor_hash.as_ref(),
            self.timestamp,
        )
    }
}

/// The canonical event digest:
/// `sha3_concat(agentId, actionType, payloadHash, predecessor | null, decimal(timestamp))`.
pub fn event_digest(
    agent_id: &str,
    action_type: ActionType,
    payload_hash: &Digest,
    predecessor_hash: Option<&Digest>,
    timestamp: i64,
) -> Digest {
    let timestamp_decimal = timestamp.to_string();
    sha3_concat(&[
        HashPart::Str(agent_id),
        HashPart::Str(action_type.as_str()),
        HashPart::Str(payload_hash.as_str()),
        predecessor_hash.map(|digest| digest.as_str()).into(),
        HashPart::Str(&timestamp_decimal),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha3;

    #[test]
    fn test_action_type_round_trips_through_str() {
        for action in ActionType::ALL {
            assert_eq!(action.as_str().parse::<ActionType>().unwrap(), action);
        }
        assert_eq!(
            "transfer".parse::<ActionType>(),
            Err(InvalidActionType("transfer".into()))
        );
    }

    #[test]
    fn test_action_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&ActionType::StateTransition).unwrap(),
            "\"state_transition\""
        );
    }

    #[test]
    fn test_event_digest_matches_canonical_stream() {
        let payload = sha3(b"payload");
        let digest = event_digest("0xA", ActionType::Request, &payload, None, 1_000);

        let stream = format!("0xA||request||{}||null||1000||", payload.as_str());
        assert_eq!(digest, sha3(stream.as_bytes()));
    }

    #[test]
    fn test_event_digest_includes_predecessor() {
        let payload = sha3(b"payload");
        let predecessor = sha3(b"previous");

        let rooted = event_digest("0xA", ActionType::Response, &payload, None, 5);
        let linked = event_digest(
            "0xA",
            ActionType::Response,
            &payload,
            Some(&predecessor),
            5,
        );
        assert_ne!(rooted, linked);

        let stream = format!(
            "0xA||response||{}||{}||5||",
            payload.as_str(),
            predecessor.as_str()
        );
        assert_eq!(linked, sha3(stream.as_bytes()));
    }
}
