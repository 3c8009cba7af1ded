//! Shared wire types for causal proofs.
//!
//! Binary values travel as `0x`-prefixed hex strings and are decoded to raw
//! bytes only at the hashing/signing boundary, so a proof serializes to the
//! same JSON shape every conforming implementation produces.

use serde::{Deserialize, Serialize};

use crate::causal::event::{ActionType, CausalEvent};

/// A 32-byte digest in transport form: `0x` followed by 64 hex characters.
///
/// Ordering is lexicographic on the full string (prefix included), which is
/// the comparison the sorted-pair combiner is defined over.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wrap a transport-form digest string without validating it.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The empty-log root sentinel, distinct from any real digest.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the string has the `0x<64-hex>` shape.
    pub fn is_wellformed(&self) -> bool {
        self.0.len() == 66
            && self.0.starts_with("0x")
            && self.0.as_bytes()[2..].iter().all(u8::is_ascii_hexdigit)
    }

    /// Decode to raw bytes. `None` when the string is not a wellformed digest.
    pub fn to_bytes(&self) -> Option<[u8; 32]> {
        if !self.is_wellformed() {
            return None;
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(&self.0[2..], &mut out).ok()?;
        Some(out)
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Digest {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Digest {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Where a proof step's sibling sits relative to the current node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    Left,
    Right,
}

/// One level of a Merkle inclusion path.
///
/// A promotion level (no sibling existed when the node was folded upward)
/// carries the self-pair sentinel: `sibling_hash == event_hash` with the
/// sibling marked `right`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofStep {
    pub event_hash: Digest,
    pub sibling_hash: Digest,
    pub position: SiblingPosition,
}

impl ProofStep {
    /// Whether this step is the promotion sentinel and must be skipped when
    /// folding toward the root.
    pub fn is_self_pair(&self) -> bool {
        self.sibling_hash == self.event_hash
    }
}

/// One element of the causal chain carried inside a proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLink {
    pub event_hash: Digest,
    pub action_type: ActionType,
    pub timestamp: i64,
    pub predecessor_hash: Option<Digest>,
}

impl From<&CausalEvent> for ChainLink {
    fn from(event: &CausalEvent) -> Self {
        Self {
            event_hash: event.event_hash.clone(),
            action_type: event.action_type,
            timestamp: event.timestamp,
            predecessor_hash: event.predecessor_hash.clone(),
        }
    }
}

/// A self-contained causal proof.
///
/// Verification needs only this value, the expected agent identifier, and the
/// expected public key; the proof owns snapshots of every event it mentions
/// and stays valid after the originating registry is gone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalProof {
    pub target_event: CausalEvent,
    pub proof_path: Vec<ProofStep>,
    pub causal_chain: Vec<ChainLink>,
    /// Registry root at proof generation time. This is the signed quantity;
    /// it may be newer than `target_event.tree_root_hash`.
    pub tree_root_hash: Digest,
    /// ECDSA signature (`0x || r || s`) over `tree_root_hash`.
    pub agent_signature: String,
}

/// Digest-and-timestamp summary of one chain element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightLink {
    pub event_hash: Digest,
    pub timestamp: i64,
}

/// The non-cryptographic proof summary used for fast admission decisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightProof {
    pub agent_id: String,
    pub target_event_hash: Digest,
    pub causal_chain: Vec<LightLink>,
    /// When this light proof was generated, Unix ms.
    pub timestamp: i64,
}

impl LightProof {
    /// Summarize a full proof for the fast path.
    pub fn from_proof(proof: &CausalProof, generated_at_ms: i64) -> Self {
        Self {
            agent_id: proof.target_event.agent_id.clone(),
            target_event_hash: proof.target_event.event_hash.clone(),
            causal_chain: proof
                .causal_chain
                .iter()
                .map(|link| LightLink {
                    event_hash: link.event_hash.clone(),
                    timestamp: link.timestamp,
                })
                .collect(),
            timestamp: generated_at_ms,
        }
    }
}
