//! Stateless proof verification.
//!
//! The verifier re-checks a proof with nothing but the proof itself, the
//! expected agent identifier, and the expected public key. Every check runs;
//! failures accumulate as human-readable strings and the proof is valid only
//! when no check objected.

use serde::Serialize;
use tracing::debug;

use crate::causal::merkle::CommitmentLog;
use crate::crypto;
use crate::types::{CausalProof, ChainLink, Digest};

/// How far back the recency term of the trust score reaches, in ms.
const RECENCY_WINDOW_MS: f64 = 300_000.0;

/// Chain length at which the depth term of the trust score saturates.
const DEPTH_SATURATION: f64 = 10.0;

/// Outcome of a full verification.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub is_valid: bool,
    /// One entry per failed check; empty exactly when the proof is valid.
    pub errors: Vec<String>,
    /// Chain length when chain integrity held, 0 otherwise.
    pub verified_actions: usize,
    /// 0.2 base + up to 0.4 for chain depth + up to 0.4 for recency; 0 on
    /// any failure.
    pub trust_score: f64,
}

/// Verify a proof against an expected agent identity and public key.
pub fn verify_proof(
    proof: &CausalProof,
    expected_agent_id: &str,
    expected_public_key: &str,
) -> VerificationReport {
    let mut errors = Vec::new();

    // Identity.
    if proof.target_event.agent_id != expected_agent_id {
        errors.push(format!(
            "Agent ID mismatch: expected {}, got {}",
            expected_agent_id, proof.target_event.agent_id
        ));
    }

    // Merkle inclusion of the target leaf under the signed root.
    if !CommitmentLog::verify_inclusion(
        &proof.target_event.event_hash,
        &proof.proof_path,
        &proof.tree_root_hash,
    ) {
        errors.push("Merkle inclusion proof verification failed".to_owned());
    }

    // Signature over the root.
    if !crypto::verify(
        proof.tree_root_hash.as_str(),
        &proof.agent_signature,
        expected_public_key,
    ) {
        errors.push("Agent signature verification failed".to_owned());
    }

    // Content integrity: the stored digest must be recomputable from the
    // event's own fields.
    if proof.target_event.content_digest() != proof.target_event.event_hash {
        errors.push("Event hash does not match event content".to_owned());
    }

    // Chain integrity.
    let chain_errors = chain_integrity_errors(&proof.causal_chain, &proof.target_event.event_hash);
    let chain_intact = chain_errors.is_empty();
    errors.extend(chain_errors);

    let verified_actions = if chain_intact {
        proof.causal_chain.len()
    } else {
        0
    };
    let is_valid = errors.is_empty();
    let trust_score = if is_valid {
        trust_score(proof.causal_chain.len(), proof.target_event.timestamp)
    } else {
        0.0
    };

    if !is_valid {
        debug!(
            agent = %proof.target_event.agent_id,
            failures = errors.len(),
            "proof verification failed"
        );
    }

    VerificationReport {
        is_valid,
        errors,
        verified_actions,
        trust_score,
    }
}

fn chain_integrity_errors(chain: &[ChainLink], target_hash: &Digest) -> Vec<String> {
    let Some(last) = chain.last() else {
        return vec!["Causal chain is empty".to_owned()];
    };

    let mut errors = Vec::new();
    if last.event_hash != *target_hash {
        errors.push("Causal chain does not terminate at the target event".to_owned());
    }
    for position in 1..chain.len() {
        let previous = &chain[position - 1];
        let current = &chain[position];
        if current.predecessor_hash.as_ref() != Some(&previous.event_hash) {
            errors.push(format!(
                "Causal chain break at position {position}: predecessor does not match previous event hash"
            ));
        }
        if current.timestamp < previous.timestamp {
            errors.push(format!(
                "Causal chain timestamp regression at position {position}"
            ));
        }
    }
    errors
}

fn trust_score(chain_len: usize, target_timestamp_ms: i64) -> f64 {
    let depth = 0.4 * (chain_len as f64 / DEPTH_SATURATION).min(1.0);
    let age_ms = (crate::now_ms() - target_timestamp_ms) as f64;
    let recency = 0.4 * (1.0 - age_ms / RECENCY_WINDOW_MS).max(0.0);
    0.2 + depth + recency
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::causal::event::ActionType;
    use crate::crypto::hash::sha3;

    fn link(hash: Digest, predecessor: Option<Digest>, ts: i64) -> ChainLink {
        ChainLink {
            event_hash: hash,
            action_type: ActionType::Request,
            timestamp: ts,
            predecessor_hash: predecessor,
        }
    }

    #[test]
    fn test_empty_chain_is_a_violation() {
        let errors = chain_integrity_errors(&[], &sha3(b"t"));
        assert_eq!(errors, vec!["Causal chain is empty".to_owned()]);
    }

    #[test]
    fn test_chain_must_end_at_target() {
        let a = sha3(b"a");
        let errors = chain_integrity_errors(&[link(a, None, 1)], &sha3(b"target"));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("terminate at the target"));
    }

    #[test]
    fn test_chain_gap_detected() {
        let a = sha3(b"a");
        let b = sha3(b"b");
        let chain = vec![link(a, None, 1), link(b.clone(), Some(sha3(b"x")), 2)];
        let errors = chain_integrity_errors(&chain, &b);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("position 1"));
    }

    #[test]
    fn test_chain_timestamp_regression_detected() {
        let a = sha3(b"a");
        let b = sha3(b"b");
        let chain = vec![
            link(a.clone(), None, 10),
            link(b.clone(), Some(a), 5),
        ];
        let errors = chain_integrity_errors(&chain, &b);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("timestamp regression"));
    }

    #[test]
    fn test_equal_timestamps_allowed() {
        let a = sha3(b"a");
        let b = sha3(b"b");
        let chain = vec![
            link(a.clone(), None, 7),
            link(b.clone(), Some(a), 7),
        ];
        assert!(chain_integrity_errors(&chain, &b).is_empty());
    }

    #[test]
    fn test_trust_score_saturates_with_depth() {
        // Past the recency window the score depends only on depth.
        let stale = crate::now_ms() - 400_000;
        let short = trust_score(2, stale);
        let deep = trust_score(10, stale);
        let deeper = trust_score(50, stale);
        assert!(short < deep);
        assert!((deep - deeper).abs() < 1e-9);
        assert!((deep - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_trust_score_decays_with_age() {
        let now = crate::now_ms();
        let fresh = trust_score(5, now);
        let stale = trust_score(5, now - 400_000);
        assert!(fresh > stale);
        // Past the recency window only base + depth remain.
        assert!((stale - (0.2 + 0.4 * 0.5)).abs() < 1e-9);
    }
}
